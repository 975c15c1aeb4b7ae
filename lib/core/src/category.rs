use serde::{Deserialize, Serialize};

/// Product-type tokens the query-cleanup guardrail knows about.
/// A token present in raw user text must survive into the cleaned query.
pub const KNOWN_PRODUCT_TYPES: &[&str] = &[
    "ring",
    "necklace",
    "earring",
    "bracelet",
    "bangle",
    "pendant",
    "chain",
    "mangalsutra",
    "anklet",
    "nose pin",
];

/// The closed vocabulary the sketch interpreter may constrain results to.
///
/// An unrecognized label is "no constraint", never an error - the strict
/// filter only engages when the interpreter names a category we actually
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrictCategory {
    Ring,
    Necklace,
}

impl StrictCategory {
    /// Parse a free-form label into the closed vocabulary.
    /// Matching is case-insensitive and whitespace-tolerant.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "ring" => Some(Self::Ring),
            "necklace" => Some(Self::Necklace),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ring => "ring",
            Self::Necklace => "necklace",
        }
    }

    /// Whether a catalog category label matches this constraint
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        category.eq_ignore_ascii_case(self.as_str())
    }
}

impl std::fmt::Display for StrictCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

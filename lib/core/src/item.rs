use serde::{Deserialize, Serialize};

/// A catalog entry: one jewellery photograph plus its metadata.
///
/// The id is the source filename and stays stable across rebuilds as long
/// as the file is unchanged. `image_path` is an opaque locator resolved by
/// the file-serving layer; the engine never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    pub image_path: String,
    pub category: String,
    #[serde(default)]
    pub caption: String,
}

impl CatalogItem {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        image_path: impl Into<String>,
        category: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            image_path: image_path.into(),
            category: category.into(),
            caption: caption.into(),
        }
    }

    /// Text used when scoring this item against a query.
    /// Falls back to a synthesized phrase when no caption exists.
    #[must_use]
    pub fn relevance_text(&self) -> String {
        if self.caption.trim().is_empty() {
            format!("a {} item", self.category)
        } else {
            self.caption.clone()
        }
    }
}

/// A per-query search result: a shallow copy of a [`CatalogItem`] plus
/// scoring state and a human-readable provenance trail.
///
/// Candidates are keyed by item id for dedup - an item surfaced by two
/// retrieval paths becomes one candidate with merged debug tags, never a
/// duplicate in the output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
}

impl Candidate {
    #[must_use]
    pub fn new(item: CatalogItem, score: f32) -> Self {
        Self {
            item,
            score,
            initial_score: None,
            debug: None,
            interpretation: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Score before any reranking pass
    #[inline]
    #[must_use]
    pub fn pre_rerank_score(&self) -> f32 {
        self.initial_score.unwrap_or(self.score)
    }

    #[must_use]
    pub fn with_initial_score(mut self, score: f32) -> Self {
        self.initial_score = Some(score);
        self
    }

    #[must_use]
    pub fn with_debug(mut self, tag: impl Into<String>) -> Self {
        self.debug = Some(tag.into());
        self
    }

    /// Append a provenance tag, separated from any existing trail.
    pub fn push_debug(&mut self, tag: &str) {
        match &mut self.debug {
            Some(trail) => {
                trail.push_str(" | ");
                trail.push_str(tag);
            }
            None => self.debug = Some(tag.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_text_prefers_caption() {
        let item = CatalogItem::new("r1", "/data/ring/r1.jpg", "ring", "gold ring");
        assert_eq!(item.relevance_text(), "gold ring");
    }

    #[test]
    fn test_relevance_text_fallback() {
        let item = CatalogItem::new("n1", "/data/necklace/n1.jpg", "necklace", "  ");
        assert_eq!(item.relevance_text(), "a necklace item");
    }

    #[test]
    fn test_push_debug_concatenates() {
        let item = CatalogItem::new("r1", "p", "ring", "");
        let mut c = Candidate::new(item, 0.5).with_debug("Src: Visual");
        c.push_debug("Shape: 0.80");
        assert_eq!(c.debug.as_deref(), Some("Src: Visual | Shape: 0.80"));
    }

    #[test]
    fn test_candidate_serializes_flat() {
        let item = CatalogItem::new("r1", "p", "ring", "gold ring");
        let c = Candidate::new(item, 0.9);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["score"], 0.9);
        assert!(json.get("initial_score").is_none());
        assert!(json.get("interpretation").is_none());
    }
}

use vitrine_core::{Error, Result};

/// Tunables for the retrieval engine.
///
/// The fusion weight and pool sizes are fixed per process; they are named
/// configuration rather than magic numbers, not runtime-tunable knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Weight of the caption signal in text fusion; the visual signal
    /// gets `1.0 - caption_weight`.
    pub caption_weight: f32,
    /// How many candidates each retrieval branch contributes before
    /// fusion/merge. Wide enough for recall, small enough to rerank.
    pub candidate_pool: usize,
    /// Result count when the caller does not ask for a specific top-k
    pub default_top_k: usize,
    /// Item ids excluded from every retrieval path
    pub denylist: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            caption_weight: 0.5,
            candidate_pool: 50,
            default_top_k: 30,
            denylist: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.caption_weight) {
            return Err(Error::Config(format!(
                "caption_weight must be within [0, 1], got {}",
                self.caption_weight
            )));
        }
        if self.candidate_pool == 0 {
            return Err(Error::Config("candidate_pool must be positive".to_string()));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn is_denylisted(&self, id: &str) -> bool {
        self.denylist.iter().any(|blocked| blocked == id)
    }
}

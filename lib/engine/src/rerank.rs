use std::sync::Arc;
use tracing::{debug, warn};
use vitrine_core::Candidate;
use vitrine_inference::RerankModel;

/// Second-stage precision ranking over a retrieval shortlist.
///
/// The fused retrieval score casts a wide net but orders it poorly; the
/// pairwise model is accurate but too expensive for the whole catalog, so
/// it only sees the merged shortlist. Logits are squashed through a
/// logistic into [0, 1]. When the model is absent or fails, the stage
/// degrades to ordering by the pre-rerank score - a reranker outage must
/// never turn into a failed search.
pub struct RerankStage {
    model: Option<Arc<dyn RerankModel>>,
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl RerankStage {
    #[must_use]
    pub fn new(model: Arc<dyn RerankModel>) -> Self {
        Self { model: Some(model) }
    }

    /// A stage with no model: always the passthrough ordering
    #[must_use]
    pub fn disabled() -> Self {
        Self { model: None }
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    /// Rescore every candidate against `query`, sort descending and trim
    /// to `top_k`.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
    ) -> Vec<Candidate> {
        if candidates.is_empty() {
            return candidates;
        }
        let Some(model) = &self.model else {
            return Self::passthrough(candidates, top_k);
        };

        let texts: Vec<String> = candidates
            .iter()
            .map(|c| c.item.relevance_text())
            .collect();

        match model.rerank_pairs(query, &texts).await {
            Ok(logits) if logits.len() == candidates.len() => {
                let mut rescored = candidates;
                for (candidate, logit) in rescored.iter_mut().zip(logits) {
                    let prob = sigmoid(logit);
                    if candidate.initial_score.is_none() {
                        candidate.initial_score = Some(candidate.score);
                    }
                    candidate.score = prob;
                    candidate.push_debug(&format!("RankLogit: {:.2} -> Prob: {:.2}", logit, prob));
                }
                rescored.sort_by(|a, b| {
                    b.score
                        .partial_cmp(&a.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                rescored.truncate(top_k);
                rescored
            }
            Ok(logits) => {
                warn!(
                    expected = candidates.len(),
                    got = logits.len(),
                    "reranker returned a mismatched score count, keeping retrieval order"
                );
                Self::passthrough(candidates, top_k)
            }
            Err(e) => {
                warn!(error = %e, "reranker unavailable, keeping retrieval order");
                Self::passthrough(candidates, top_k)
            }
        }
    }

    /// Degraded path: candidates keep their pre-rerank score and are
    /// ordered by it.
    fn passthrough(mut candidates: Vec<Candidate>, top_k: usize) -> Vec<Candidate> {
        debug!(count = candidates.len(), "rerank passthrough");
        for candidate in &mut candidates {
            candidate.score = candidate.pre_rerank_score();
            if candidate.debug.is_none() {
                candidate.debug = Some(format!("Init: {:.2}", candidate.score));
            }
        }
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(top_k);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::CatalogItem;
    use vitrine_inference::mock::MockRerankModel;

    fn candidate(id: &str, caption: &str, score: f32) -> Candidate {
        Candidate::new(
            CatalogItem::new(id, format!("/data/{}", id), "ring", caption),
            score,
        )
        .with_initial_score(score)
    }

    #[tokio::test]
    async fn test_rerank_orders_by_relevance() {
        let stage = RerankStage::new(Arc::new(MockRerankModel::new()));
        let candidates = vec![
            candidate("n1", "pearl necklace", 0.9),
            candidate("r1", "gold ring", 0.1),
        ];
        let ranked = stage.rerank("gold ring", candidates, 5).await;
        assert_eq!(ranked[0].id(), "r1");
        assert!(ranked[0].score > 0.5);
        assert!(ranked[0].score <= 1.0);
        assert_eq!(ranked[0].initial_score, Some(0.1));
    }

    #[tokio::test]
    async fn test_failure_degrades_to_initial_order() {
        let stage = RerankStage::new(Arc::new(MockRerankModel::failing()));
        let candidates = vec![
            candidate("a", "gold ring", 0.2),
            candidate("b", "silver ring", 0.8),
        ];
        let ranked = stage.rerank("gold ring", candidates, 5).await;
        assert_eq!(ranked[0].id(), "b");
        assert!((ranked[0].score - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_disabled_stage_is_passthrough() {
        let stage = RerankStage::disabled();
        let candidates = vec![candidate("a", "x", 0.3), candidate("b", "y", 0.7)];
        let ranked = stage.rerank("anything", candidates, 1).await;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id(), "b");
    }

    #[tokio::test]
    async fn test_truncates_to_top_k() {
        let stage = RerankStage::new(Arc::new(MockRerankModel::new()));
        let candidates = (0..10)
            .map(|i| candidate(&format!("c{}", i), "gold ring", 0.5))
            .collect();
        let ranked = stage.rerank("gold ring", candidates, 3).await;
        assert_eq!(ranked.len(), 3);
    }

    #[tokio::test]
    async fn test_uses_category_fallback_text() {
        // Candidate with no caption is scored via "a ring item"
        let stage = RerankStage::new(Arc::new(MockRerankModel::new()));
        let candidates = vec![candidate("r1", "", 0.5), candidate("n1", "bracelet", 0.5)];
        let ranked = stage.rerank("ring", candidates, 2).await;
        assert_eq!(ranked[0].id(), "r1");
    }
}

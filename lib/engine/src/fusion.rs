//! Hybrid text fusion and pure visual search.

use crate::{EngineState, SearchEngine};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use vitrine_core::{Candidate, Result, Vector};

impl SearchEngine {
    /// Hybrid text search: cross-modal visual candidates fused with
    /// caption-similarity candidates, then reranked.
    ///
    /// Both branches contribute up to `candidate_pool` positions. The
    /// union is scored as `(1 - w) * visual + w * caption` with the
    /// configured caption weight, a position missing from one branch
    /// scoring 0 on that side.
    pub async fn search_by_text(&self, query: &str, top_k: usize) -> Result<Vec<Candidate>> {
        let Some(state) = self.state() else {
            warn!("text search requested with no index loaded");
            return Ok(Vec::new());
        };
        let candidates = self.fuse_text_candidates(&state, query).await?;
        debug!(query, candidates = candidates.len(), "text fusion complete");
        Ok(self.rerank.rerank(query, candidates, top_k).await)
    }

    /// The fused (pre-rerank) candidate set for a text query
    pub(crate) async fn fuse_text_candidates(
        &self,
        state: &EngineState,
        query: &str,
    ) -> Result<Vec<Candidate>> {
        let embeddings = self.embedder.embed_text(&[query.to_string()]).await?;
        let query_vec = match embeddings.into_iter().next() {
            Some(v) => Vector::new(v).normalized(),
            None => return Ok(Vec::new()),
        };

        let pool = self.config.candidate_pool;
        let visual_scores: HashMap<usize, f32> =
            state.photo_index().search(&query_vec, pool).into_iter().collect();

        let caption_scores = state.caption_embeddings().scores_against(&query_vec);
        let mut caption_rank: Vec<usize> = (0..caption_scores.len()).collect();
        caption_rank.sort_by(|&a, &b| {
            caption_scores[b]
                .partial_cmp(&caption_scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        caption_rank.truncate(pool);
        let caption_set: HashSet<usize> = caption_rank.into_iter().collect();

        let mut positions: HashSet<usize> = visual_scores.keys().copied().collect();
        positions.extend(caption_set.iter().copied());

        let caption_weight = self.config.caption_weight;
        let visual_weight = 1.0 - caption_weight;

        // Iteration order over the union is unspecified, so equal-score
        // candidates may tie-break differently between runs.
        let mut candidates = Vec::with_capacity(positions.len());
        for position in positions {
            let Some(item) = state.catalog().get(position) else {
                debug!(position, "dropping search hit beyond catalog range");
                continue;
            };
            if self.config.is_denylisted(&item.id) {
                continue;
            }

            let v_score = visual_scores.get(&position).copied().unwrap_or(0.0);
            let c_score = caption_scores.get(position).copied().unwrap_or(0.0);
            let fused = visual_weight * v_score + caption_weight * c_score;

            let mut sources = Vec::new();
            if visual_scores.contains_key(&position) {
                sources.push("Visual");
            }
            if caption_set.contains(&position) {
                sources.push("Text");
            }

            candidates.push(
                Candidate::new(item.clone(), fused)
                    .with_initial_score(fused)
                    .with_debug(format!("Src: {}", sources.join("+"))),
            );
        }
        Ok(candidates)
    }

    /// Visual-to-visual search for an uploaded photo. No caption fusion and
    /// no reranking: same-space similarity needs no semantic bridging, and
    /// the pairwise text model has no comparable signal to add.
    pub async fn search_by_image(&self, image: &[u8], top_k: usize) -> Result<Vec<Candidate>> {
        let embedding = self.embedder.embed_image(image).await?;
        Ok(self.search_by_image_embedding(&Vector::new(embedding), top_k))
    }

    /// Visual search for an already-computed image embedding
    #[must_use]
    pub fn search_by_image_embedding(&self, embedding: &Vector, top_k: usize) -> Vec<Candidate> {
        let Some(state) = self.state() else {
            warn!("image search requested with no index loaded");
            return Vec::new();
        };
        let query = embedding.normalized();
        state
            .photo_index()
            .search(&query, top_k)
            .into_iter()
            .filter_map(|(position, score)| {
                let item = state.catalog().get(position).or_else(|| {
                    debug!(position, "dropping search hit beyond catalog range");
                    None
                })?;
                if self.config.is_denylisted(&item.id) {
                    return None;
                }
                Some(Candidate::new(item.clone(), score))
            })
            .collect()
    }
}

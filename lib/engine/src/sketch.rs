//! Sketch interpretation pipeline.
//!
//! One pass per request, no state between requests:
//! interpret the drawing into a description and an optional category,
//! retrieve by the description (hard-filtered to the category when one
//! was named), retrieve by shape against the sketch index, merge both
//! streams keyed by item id, then rerank the merged shortlist against
//! the description.

use crate::SearchEngine;
use std::collections::HashMap;
use tracing::{debug, warn};
use vitrine_core::{Candidate, Result, Vector};
use vitrine_inference::SketchReading;

impl SearchEngine {
    /// Search the catalog with a hand-drawn sketch. Returns the ranked
    /// candidates together with the interpreted description so callers
    /// can show the user what the engine thought it saw.
    pub async fn search_by_sketch(
        &self,
        sketch: &[u8],
        top_k: usize,
    ) -> Result<(Vec<Candidate>, String)> {
        let Some(state) = self.state() else {
            warn!("sketch search requested with no index loaded");
            return Ok((Vec::new(), String::new()));
        };

        let reading = match self.interpreter.interpret(sketch).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, "sketch interpreter unavailable, using fallback reading");
                SketchReading::fallback()
            }
        };
        debug!(
            description = %reading.description,
            category = ?reading.category,
            "sketch interpreted"
        );

        // Branch 1: text retrieval on the interpreted description. The
        // category constraint is a hard filter here - when the interpreter
        // is confident we trade recall for precision.
        let mut text_candidates = match self
            .search_by_text(&reading.description, self.config.candidate_pool)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "text branch failed during sketch search");
                Vec::new()
            }
        };
        if let Some(category) = reading.category {
            text_candidates.retain(|c| category.matches(&c.item.category));
        }

        // Branch 2: shape retrieval against the sketch index, deliberately
        // unfiltered - shape similarity is category-agnostic and catches
        // interpreter misclassifications.
        let shape_hits = match self.embedder.embed_sketch(sketch).await {
            Ok(embedding) => {
                let query = Vector::new(embedding).normalized();
                state.sketch_index().search(&query, self.config.candidate_pool)
            }
            Err(e) => {
                warn!(error = %e, "sketch embedding failed, shape branch skipped");
                Vec::new()
            }
        };

        // Merge keyed by id. Scores are not summed or averaged across
        // branches; final scoring belongs to the reranker.
        let mut merged: Vec<Candidate> = Vec::with_capacity(text_candidates.len());
        let mut position_by_id: HashMap<String, usize> = HashMap::new();
        for candidate in text_candidates {
            position_by_id.insert(candidate.id().to_string(), merged.len());
            merged.push(candidate);
        }
        for (position, score) in shape_hits {
            let Some(item) = state.catalog().get(position) else {
                debug!(position, "dropping sketch hit beyond catalog range");
                continue;
            };
            if self.config.is_denylisted(&item.id) {
                continue;
            }
            match position_by_id.get(&item.id) {
                Some(&i) => merged[i].push_debug(&format!("Shape: {:.2}", score)),
                None => {
                    position_by_id.insert(item.id.clone(), merged.len());
                    merged.push(
                        Candidate::new(item.clone(), score)
                            .with_initial_score(score)
                            .with_debug(format!("Shape: {:.2}", score)),
                    );
                }
            }
        }

        for candidate in &mut merged {
            candidate.interpretation = Some(reading.description.clone());
        }

        let ranked = self.rerank.rerank(&reading.description, merged, top_k).await;
        Ok((ranked, reading.description))
    }
}

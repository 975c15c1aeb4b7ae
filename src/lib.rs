//! # vitrine
//!
//! Multi-modal search over a jewellery photo catalog. Describe a piece in
//! free text, upload an example photo, draw a sketch or dictate a query -
//! vitrine answers with one deduplicated, score-ordered result list.
//!
//! ## Architecture
//!
//! Retrieval is two-staged: cheap, wide candidate fusion followed by an
//! expensive pairwise rerank over the shortlist. Text queries fuse
//! cross-modal visual similarity with caption similarity; sketch queries
//! run an interpretation pipeline that merges description-based and
//! shape-based retrieval before the final rerank. Every external model is
//! a collaborator behind a trait, and every collaborator outage degrades
//! to a ranked result instead of an error.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! cargo install vitrine
//! vitrine --data-dir ./data/images --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vitrine::prelude::*;
//! use vitrine_inference::mock::{MockEmbedder, MockRerankModel, MockSketchInterpreter};
//!
//! # async fn example() -> vitrine::Result<()> {
//! let engine = SearchEngine::new(
//!     Arc::new(MockEmbedder::new(512)),
//!     Arc::new(MockSketchInterpreter::scripted("heart ring", None)),
//!     RerankStage::new(Arc::new(MockRerankModel::new())),
//!     EngineConfig::default(),
//! )?;
//!
//! // Install a state built from catalog artifacts, then search
//! let results = engine.search_by_text("gold ring with ruby", 10).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - [`vitrine_core`] - vectors, embedding matrices, the exact index, records
//! - [`vitrine_storage`] - catalog scanning, fingerprints, artifact snapshots
//! - [`vitrine_inference`] - external model collaborators (HTTP + mocks)
//! - [`vitrine_engine`] - fusion, reranking, the sketch pipeline
//! - [`vitrine_api`] - REST endpoints and static image serving

// Re-export core types
pub use vitrine_core::{
    Candidate, CatalogItem, EmbeddingMatrix, Error, FlatIpIndex, Result, StrictCategory, Vector,
};

// Re-export storage
pub use vitrine_storage::{catalog_fingerprint, ArtifactSet, ArtifactStore, CatalogStore};

// Re-export inference contracts
pub use vitrine_inference::{
    Captioner, CleanedQuery, Embedder, RerankModel, SketchInterpreter, SketchReading, TextCleaner,
    Transcriber,
};

// Re-export engine
pub use vitrine_engine::{
    rebuild_state, state_from_parts, EngineConfig, EngineState, RerankStage, SearchEngine,
};

// Re-export API
pub use vitrine_api::{ApiContext, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Candidate, CatalogItem, CatalogStore, EmbeddingMatrix, EngineConfig, EngineState, Error,
        FlatIpIndex, RerankStage, Result, SearchEngine, StrictCategory, Vector,
    };
}

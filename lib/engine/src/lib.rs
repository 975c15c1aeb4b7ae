//! # vitrine Engine
//!
//! The hybrid multi-modal retrieval engine: given text, an example photo
//! or a hand-drawn sketch, produce one deduplicated, score-ordered list of
//! catalog items.
//!
//! - [`SearchEngine`] - the request-facing service object; construct once,
//!   share everywhere
//! - [`EngineState`] - the immutable per-session catalog + indices,
//!   swapped wholesale on rebuild
//! - [`RerankStage`] - retrieve-broad-then-rerank-narrow second stage with
//!   graceful degradation
//! - [`EngineConfig`] - named tunables (fusion weight, pool sizes, denylist)
//! - [`rebuild::rebuild_state`] - the startup single-writer build phase
//!
//! Search surface: [`SearchEngine::search_by_text`],
//! [`SearchEngine::search_by_image`], [`SearchEngine::search_by_sketch`].

pub mod config;
pub mod fusion;
pub mod rebuild;
pub mod rerank;
pub mod service;
pub mod sketch;
pub mod state;

pub use config::EngineConfig;
pub use rebuild::{rebuild_state, state_from_parts};
pub use rerank::RerankStage;
pub use service::SearchEngine;
pub use state::EngineState;

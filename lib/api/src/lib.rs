//! # vitrine API
//!
//! Thin REST layer over [`vitrine_engine::SearchEngine`]: text, image,
//! sketch and voice search endpoints plus static catalog-image serving.

pub mod rest;

pub use rest::{ApiContext, RestApi};

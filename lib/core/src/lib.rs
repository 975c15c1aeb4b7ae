//! # vitrine Core
//!
//! Core library for the vitrine multi-modal search engine.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`Vector`] - Dense embedding vector with normalization helpers
//! - [`EmbeddingMatrix`] - Row-aligned embedding table, one row per catalog item
//! - [`FlatIpIndex`] - Exact exhaustive inner-product nearest-neighbor index
//! - [`CatalogItem`] / [`Candidate`] - Catalog records and per-query results
//! - [`StrictCategory`] - Closed category vocabulary for hard filtering
//!
//! ## Example
//!
//! ```rust
//! use vitrine_core::{EmbeddingMatrix, FlatIpIndex, Vector};
//!
//! // Two unit rows: item 0 points along x, item 1 along y
//! let matrix = EmbeddingMatrix::from_rows(vec![
//!     vec![1.0, 0.0],
//!     vec![0.0, 1.0],
//! ]).unwrap();
//!
//! let index = FlatIpIndex::build(matrix);
//! let hits = index.search(&Vector::new(vec![1.0, 0.0]), 1);
//! assert_eq!(hits[0].0, 0);
//! ```

pub mod category;
pub mod error;
pub mod index;
pub mod item;
pub mod matrix;
pub mod vector;

pub use category::{StrictCategory, KNOWN_PRODUCT_TYPES};
pub use error::{Error, Result};
pub use index::FlatIpIndex;
pub use item::{Candidate, CatalogItem};
pub use matrix::{EmbeddingMatrix, NORM_TOLERANCE};
pub use vector::Vector;

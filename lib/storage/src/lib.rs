//! # vitrine Storage
//!
//! Catalog scanning and artifact persistence for vitrine:
//!
//! - [`CatalogStore`] - the ordered, read-only item list shared by all queries
//! - [`scan_catalog`] / [`catalog_fingerprint`] - directory ingestion and
//!   staleness detection
//! - [`ArtifactStore`] / [`ArtifactSet`] - embedding-matrix snapshots,
//!   written atomically and reloaded wholesale at startup

pub mod artifacts;
pub mod catalog;

pub use artifacts::{ArtifactSet, ArtifactStore};
pub use catalog::{catalog_fingerprint, scan_catalog, CatalogStore, ScannedImage};

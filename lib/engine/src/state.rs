use tracing::warn;
use vitrine_core::{EmbeddingMatrix, Error, FlatIpIndex, Result};
use vitrine_storage::{ArtifactSet, CatalogStore};

/// Everything one search session reads: the catalog plus both visual
/// indices and the caption matrix, all row-aligned.
///
/// Immutable once built. A rebuild constructs a fresh `EngineState` and
/// the engine swaps the shared `Arc` in one write - queries in flight keep
/// the state they started with, so index and metadata can never drift
/// apart mid-request.
#[derive(Debug)]
pub struct EngineState {
    catalog: CatalogStore,
    photo_index: FlatIpIndex,
    sketch_index: FlatIpIndex,
    caption_embeddings: EmbeddingMatrix,
    fingerprint: String,
}

impl EngineState {
    pub fn new(
        catalog: CatalogStore,
        photo: EmbeddingMatrix,
        sketch: EmbeddingMatrix,
        captions: EmbeddingMatrix,
        fingerprint: impl Into<String>,
    ) -> Result<Self> {
        for (name, matrix) in [("photo", &photo), ("sketch", &sketch), ("captions", &captions)] {
            if matrix.rows() != catalog.len() {
                return Err(Error::RowMismatch {
                    matrix: name,
                    rows: matrix.rows(),
                    items: catalog.len(),
                });
            }
            if let Some(row) = matrix.validate_normalized() {
                warn!(matrix = name, row, "embedding row is not unit-normalized");
            }
        }

        Ok(Self {
            catalog,
            photo_index: FlatIpIndex::build(photo),
            sketch_index: FlatIpIndex::build(sketch),
            caption_embeddings: captions,
            fingerprint: fingerprint.into(),
        })
    }

    pub fn from_artifacts(artifacts: ArtifactSet) -> Result<Self> {
        artifacts.validate()?;
        Self::new(
            CatalogStore::new(artifacts.items),
            artifacts.photo,
            artifacts.sketch,
            artifacts.captions,
            artifacts.fingerprint,
        )
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn photo_index(&self) -> &FlatIpIndex {
        &self.photo_index
    }

    #[inline]
    #[must_use]
    pub fn sketch_index(&self) -> &FlatIpIndex {
        &self.sketch_index
    }

    #[inline]
    #[must_use]
    pub fn caption_embeddings(&self) -> &EmbeddingMatrix {
        &self.caption_embeddings
    }

    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use vitrine_core::{CatalogItem, EmbeddingMatrix, Error, Result};

/// Everything a rebuild produces: the captioned item list plus the three
/// row-aligned embedding matrices, stamped with the catalog fingerprint
/// they were built from. Loaded wholesale at startup and swapped, never
/// patched in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub fingerprint: String,
    pub items: Vec<CatalogItem>,
    pub photo: EmbeddingMatrix,
    pub sketch: EmbeddingMatrix,
    pub captions: EmbeddingMatrix,
}

impl ArtifactSet {
    /// Check row alignment: every matrix must have one row per item.
    pub fn validate(&self) -> Result<()> {
        for (name, matrix) in [
            ("photo", &self.photo),
            ("sketch", &self.sketch),
            ("captions", &self.captions),
        ] {
            if matrix.rows() != self.items.len() {
                return Err(Error::RowMismatch {
                    matrix: name,
                    rows: matrix.rows(),
                    items: self.items.len(),
                });
            }
        }
        Ok(())
    }
}

/// On-disk home for the artifact snapshot
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(index_dir: P) -> Result<Self> {
        let index_dir = index_dir.as_ref();
        std::fs::create_dir_all(index_dir)?;
        Ok(Self {
            path: index_dir.join("artifacts.bin"),
        })
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot atomically: serialize to a temp file, then rename.
    pub fn save(&self, artifacts: &ArtifactSet) -> Result<()> {
        artifacts.validate()?;
        let data = bincode::serialize(artifacts)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let temp_file = self.path.with_extension("tmp");
        std::fs::write(&temp_file, &data)?;
        std::fs::rename(&temp_file, &self.path)?;
        info!(
            items = artifacts.items.len(),
            path = %self.path.display(),
            "artifact snapshot saved"
        );
        Ok(())
    }

    /// Load the snapshot from disk, if one exists and passes row validation
    pub fn load(&self) -> Result<Option<ArtifactSet>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read(&self.path)?;
        let artifacts: ArtifactSet = bincode::deserialize(&data)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        artifacts.validate()?;
        Ok(Some(artifacts))
    }
}

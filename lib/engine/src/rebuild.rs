//! Startup catalog rebuild.
//!
//! A single-writer phase that runs before any query is served: scan the
//! image tree, caption what is new, embed everything into the three
//! matrices, persist the artifact snapshot and hand back a fresh
//! [`EngineState`] for the engine to install. When the stored artifact's
//! fingerprint already matches the scanned catalog, the embedding work is
//! skipped and the snapshot is loaded as-is.

use crate::EngineState;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};
use vitrine_core::{CatalogItem, EmbeddingMatrix, Error, Result};
use vitrine_inference::{Captioner, Embedder};
use vitrine_storage::{catalog_fingerprint, scan_catalog, ArtifactSet, ArtifactStore, CatalogStore};

/// Caption batch size when encoding caption text
const CAPTION_BATCH: usize = 32;

/// Build (or reload) the session state for the catalog under `data_dir`.
pub async fn rebuild_state(
    data_dir: &Path,
    artifact_store: &ArtifactStore,
    embedder: &dyn Embedder,
    captioner: &dyn Captioner,
) -> Result<EngineState> {
    let scanned = scan_catalog(data_dir)?;
    let previous = match artifact_store.load() {
        Ok(previous) => previous,
        Err(e) => {
            warn!(error = %e, "stored artifacts unreadable, forcing a full rebuild");
            None
        }
    };

    let known_captions: HashMap<String, String> = previous
        .as_ref()
        .map(|artifacts| {
            artifacts
                .items
                .iter()
                .map(|item| (item.id.clone(), item.caption.clone()))
                .collect()
        })
        .unwrap_or_default();

    let mut items = Vec::with_capacity(scanned.len());
    for image in &scanned {
        let caption = match known_captions.get(&image.id) {
            Some(caption) => caption.clone(),
            None => caption_new_item(captioner, image.image_path.as_str(), &image.category).await,
        };
        items.push(CatalogItem::new(
            image.id.clone(),
            image.image_path.clone(),
            image.category.clone(),
            caption,
        ));
    }

    if items.is_empty() {
        warn!("catalog is empty, installing an empty state");
        return EngineState::new(
            CatalogStore::new(items),
            EmbeddingMatrix::empty(0),
            EmbeddingMatrix::empty(0),
            EmbeddingMatrix::empty(0),
            catalog_fingerprint(&[]),
        );
    }

    let fingerprint = catalog_fingerprint(&items);
    if let Some(artifacts) = previous {
        if artifacts.fingerprint == fingerprint {
            info!(items = artifacts.items.len(), "catalog unchanged, reusing stored artifacts");
            return EngineState::from_artifacts(artifacts);
        }
        info!("catalog fingerprint changed, rebuilding embedding matrices");
    } else {
        info!("no stored artifacts, building embedding matrices");
    }

    let photo = embed_images(embedder, &items, ImageDomain::Photo).await?;
    let sketch = embed_images(embedder, &items, ImageDomain::Sketch).await?;
    let captions = embed_captions(embedder, &items).await?;

    let artifacts = ArtifactSet {
        fingerprint,
        items,
        photo,
        sketch,
        captions,
    };
    if let Err(e) = artifact_store.save(&artifacts) {
        warn!(error = %e, "failed to persist artifact snapshot, continuing unsaved");
    }

    let state = EngineState::from_artifacts(artifacts)?;
    info!(
        items = state.catalog().len(),
        "catalog rebuild complete"
    );
    Ok(state)
}

async fn caption_new_item(captioner: &dyn Captioner, image_path: &str, category: &str) -> String {
    let fallback = || format!("a {} made of gold or silver", category);
    let bytes = match std::fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(image_path, error = %e, "could not read image for captioning");
            return fallback();
        }
    };
    match captioner.caption(&bytes, Some(category)).await {
        Ok(caption) if !caption.trim().is_empty() => caption,
        Ok(_) => fallback(),
        Err(e) => {
            warn!(image_path, error = %e, "captioner unavailable");
            fallback()
        }
    }
}

#[derive(Clone, Copy)]
enum ImageDomain {
    Photo,
    Sketch,
}

/// Embed every catalog image into one matrix. Items whose file cannot be
/// read or embedded get a fixed placeholder row so row alignment survives;
/// the rebuild only fails when not a single image could be embedded.
async fn embed_images(
    embedder: &dyn Embedder,
    items: &[CatalogItem],
    domain: ImageDomain,
) -> Result<EmbeddingMatrix> {
    let mut rows: Vec<Option<Vec<f32>>> = Vec::with_capacity(items.len());
    for item in items {
        let embedded = match std::fs::read(&item.image_path) {
            Ok(bytes) => {
                let result = match domain {
                    ImageDomain::Photo => embedder.embed_image(&bytes).await,
                    ImageDomain::Sketch => embedder.embed_photo_as_sketch(&bytes).await,
                };
                match result {
                    Ok(v) => Some(v),
                    Err(e) => {
                        warn!(id = %item.id, error = %e, "embedding failed, using placeholder row");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(id = %item.id, error = %e, "image unreadable, using placeholder row");
                None
            }
        };
        rows.push(embedded);
    }

    let dim = rows
        .iter()
        .flatten()
        .next()
        .map(Vec::len)
        .ok_or_else(|| {
            Error::Inference("could not embed any catalog image".to_string())
        })?;

    EmbeddingMatrix::from_rows(
        rows.into_iter()
            .map(|row| row.unwrap_or_else(|| placeholder_row(dim)))
            .collect(),
    )
}

async fn embed_captions(embedder: &dyn Embedder, items: &[CatalogItem]) -> Result<EmbeddingMatrix> {
    if items.is_empty() {
        return Ok(EmbeddingMatrix::empty(0));
    }
    // Empty captions become a single space so the encoder never sees an
    // empty input.
    let texts: Vec<String> = items
        .iter()
        .map(|item| {
            if item.caption.trim().is_empty() {
                " ".to_string()
            } else {
                item.caption.clone()
            }
        })
        .collect();

    let mut rows = Vec::with_capacity(texts.len());
    for batch in texts.chunks(CAPTION_BATCH) {
        rows.extend(embedder.embed_text(batch).await?);
    }
    EmbeddingMatrix::from_rows(rows)
}

fn placeholder_row(dim: usize) -> Vec<f32> {
    let mut row = vec![0.0; dim];
    if dim > 0 {
        row[0] = 1.0;
    }
    row
}

/// Convenience for tests and embedded use: state straight from parts
/// without touching disk.
pub fn state_from_parts(
    items: Vec<CatalogItem>,
    photo: EmbeddingMatrix,
    sketch: EmbeddingMatrix,
    captions: EmbeddingMatrix,
) -> Result<EngineState> {
    let fingerprint = catalog_fingerprint(&items);
    EngineState::new(CatalogStore::new(items), photo, sketch, captions, fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_inference::mock::{MockCaptioner, MockEmbedder};

    fn write_catalog(dir: &Path) {
        let ring_dir = dir.join("ring");
        std::fs::create_dir_all(&ring_dir).unwrap();
        std::fs::write(ring_dir.join("r1.jpg"), b"r1-bytes").unwrap();
        std::fs::write(ring_dir.join("r2.jpg"), b"r2-bytes").unwrap();
    }

    #[tokio::test]
    async fn test_rebuild_builds_aligned_state() {
        let data_dir = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();
        write_catalog(data_dir.path());

        let store = ArtifactStore::new(index_dir.path()).unwrap();
        let embedder = MockEmbedder::new(8);
        let captioner = MockCaptioner::new();

        let state = rebuild_state(data_dir.path(), &store, &embedder, &captioner)
            .await
            .unwrap();
        assert_eq!(state.catalog().len(), 2);
        assert_eq!(state.photo_index().len(), 2);
        assert_eq!(state.sketch_index().len(), 2);
        assert!(state.caption_embeddings().validate_normalized().is_none());
        // Snapshot landed on disk
        assert!(store.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unchanged_catalog_reuses_artifacts() {
        let data_dir = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();
        write_catalog(data_dir.path());

        let store = ArtifactStore::new(index_dir.path()).unwrap();
        let embedder = MockEmbedder::new(8);
        let captioner = MockCaptioner::new();

        let first = rebuild_state(data_dir.path(), &store, &embedder, &captioner)
            .await
            .unwrap();
        // Second run must reuse the snapshot: a failing captioner would
        // only be consulted for new items.
        let second = rebuild_state(
            data_dir.path(),
            &store,
            &embedder,
            &MockCaptioner::failing(),
        )
        .await
        .unwrap();
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(second.catalog().len(), 2);
    }

    #[tokio::test]
    async fn test_catalog_change_triggers_rebuild() {
        let data_dir = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();
        write_catalog(data_dir.path());

        let store = ArtifactStore::new(index_dir.path()).unwrap();
        let embedder = MockEmbedder::new(8);
        let captioner = MockCaptioner::new();

        let first = rebuild_state(data_dir.path(), &store, &embedder, &captioner)
            .await
            .unwrap();

        std::fs::write(data_dir.path().join("ring").join("r3.jpg"), b"r3-bytes").unwrap();
        let second = rebuild_state(data_dir.path(), &store, &embedder, &captioner)
            .await
            .unwrap();
        assert_ne!(first.fingerprint(), second.fingerprint());
        assert_eq!(second.catalog().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_catalog_builds_empty_state() {
        let data_dir = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();

        let store = ArtifactStore::new(index_dir.path()).unwrap();
        let state = rebuild_state(
            data_dir.path(),
            &store,
            &MockEmbedder::new(8),
            &MockCaptioner::new(),
        )
        .await
        .unwrap();
        assert!(state.catalog().is_empty());
        assert!(state.photo_index().is_empty());
    }

    #[tokio::test]
    async fn test_captioner_failure_uses_fallback_caption() {
        let data_dir = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();
        write_catalog(data_dir.path());

        let store = ArtifactStore::new(index_dir.path()).unwrap();
        let state = rebuild_state(
            data_dir.path(),
            &store,
            &MockEmbedder::new(8),
            &MockCaptioner::failing(),
        )
        .await
        .unwrap();
        let item = state.catalog().get_by_id("r1.jpg").unwrap();
        assert_eq!(item.caption, "a ring made of gold or silver");
    }
}

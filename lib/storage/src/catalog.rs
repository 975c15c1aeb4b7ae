use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use vitrine_core::{CatalogItem, Error, Result};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// The fixed, ordered collection of searchable items for one session.
///
/// Built once per rebuild and read-only afterwards. Item position equals
/// the row position in every embedding matrix built from the same catalog.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    items: Vec<CatalogItem>,
    by_id: HashMap<String, usize>,
}

impl CatalogStore {
    #[must_use]
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let by_id = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();
        Self { items, by_id }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Item at a row position, if in range
    #[inline]
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&CatalogItem> {
        self.items.get(position)
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&CatalogItem> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }
}

/// An image discovered during a catalog scan, before captioning
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedImage {
    pub id: String,
    pub image_path: String,
    pub category: String,
}

/// Scan a catalog directory tree: one subdirectory per category, image
/// files inside. The item id is the file name. Results are sorted by
/// (category, id) so row order and fingerprints are stable across scans.
pub fn scan_catalog(data_dir: &Path) -> Result<Vec<ScannedImage>> {
    if !data_dir.is_dir() {
        return Err(Error::CatalogUnreadable(format!(
            "data directory not found: {}",
            data_dir.display()
        )));
    }

    let mut scanned = Vec::new();
    for category_entry in std::fs::read_dir(data_dir)? {
        let category_entry = category_entry?;
        let category_path = category_entry.path();
        if !category_path.is_dir() {
            continue;
        }
        let category = category_entry.file_name().to_string_lossy().to_string();

        for image_entry in std::fs::read_dir(&category_path)? {
            let image_entry = image_entry?;
            let image_path = image_entry.path();
            if !is_image_file(&image_path) {
                continue;
            }
            let id = image_entry.file_name().to_string_lossy().to_string();
            scanned.push(ScannedImage {
                id,
                image_path: image_path.to_string_lossy().replace('\\', "/"),
                category: category.clone(),
            });
        }
    }

    scanned.sort_by(|a, b| (&a.category, &a.id).cmp(&(&b.category, &b.id)));
    debug!(count = scanned.len(), "catalog scan complete");
    Ok(scanned)
}

fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
}

/// Content fingerprint of a catalog: sha256 over every item's identity and
/// caption. Embedding artifacts store the fingerprint they were built from;
/// a mismatch on startup forces a full rebuild instead of serving stale rows.
#[must_use]
pub fn catalog_fingerprint(items: &[CatalogItem]) -> String {
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(item.id.as_bytes());
        hasher.update([0]);
        hasher.update(item.image_path.as_bytes());
        hasher.update([0]);
        hasher.update(item.category.as_bytes());
        hasher.update([0]);
        hasher.update(item.caption.as_bytes());
        hasher.update([0xff]);
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

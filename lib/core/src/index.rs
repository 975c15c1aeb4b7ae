use crate::{EmbeddingMatrix, Vector};

/// Exact exhaustive inner-product index.
///
/// Scans every row of the backing [`EmbeddingMatrix`] and returns the true
/// top-k by inner product. Catalogs here are small, so exactness wins over
/// sub-linear lookup. The query must already be unit-normalized; no
/// normalization happens inside the index. Returned positions are row
/// indices into the matrix (and therefore into the catalog order the
/// matrix was built from) - callers validate positions against their
/// current catalog length before dereferencing metadata.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    matrix: EmbeddingMatrix,
}

impl FlatIpIndex {
    #[must_use]
    pub fn build(matrix: EmbeddingMatrix) -> Self {
        Self { matrix }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matrix.rows()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    /// Top-k rows by inner product, ordered descending by score.
    /// Returns fewer than `k` pairs when the matrix has fewer rows.
    pub fn search(&self, query: &Vector, k: usize) -> Vec<(usize, f32)> {
        let scores = self.matrix.scores_against(query);
        let mut hits: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        hits
    }
}

use crate::{vector, Error, Result, Vector};
use serde::{Deserialize, Serialize};

/// Tolerance for the unit-norm row invariant
pub const NORM_TOLERANCE: f32 = 1e-4;

/// A dense, row-aligned embedding matrix.
///
/// Row `i` corresponds to catalog item `i`. Rows are stored contiguously
/// for cache-friendly scans. All rows are expected to be unit-normalized
/// so that inner product equals cosine similarity; [`EmbeddingMatrix::from_rows`]
/// normalizes on ingest and [`EmbeddingMatrix::validate_normalized`] checks
/// the invariant on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Create an empty matrix of the given dimensionality
    #[must_use]
    pub fn empty(dim: usize) -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            dim,
        }
    }

    /// Build from per-item rows, normalizing each row to unit length.
    /// Every row must share the same dimension.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = match rows.first() {
            Some(first) => first.len(),
            None => return Ok(Self::empty(0)),
        };

        let mut data = Vec::with_capacity(rows.len() * dim);
        let row_count = rows.len();
        for row in rows {
            if row.len() != dim {
                return Err(Error::InvalidDimension {
                    expected: dim,
                    actual: row.len(),
                });
            }
            let mut v = Vector::new(row);
            v.normalize();
            data.extend_from_slice(v.as_slice());
        }

        Ok(Self {
            data,
            rows: row_count,
            dim,
        })
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Row `i` as a slice. Panics if out of range; callers index by
    /// positions they already bounds-checked against the catalog.
    #[inline]
    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        let start = i * self.dim;
        &self.data[start..start + self.dim]
    }

    /// Inner product of `query` against every row, in row order.
    pub fn scores_against(&self, query: &Vector) -> Vec<f32> {
        if query.dim() != self.dim {
            return vec![0.0; self.rows];
        }
        (0..self.rows)
            .map(|i| vector::dot(query.as_slice(), self.row(i)))
            .collect()
    }

    /// Verify that every row has unit L2 norm within [`NORM_TOLERANCE`].
    /// Returns the first offending row index, if any.
    #[must_use]
    pub fn validate_normalized(&self) -> Option<usize> {
        (0..self.rows).find(|&i| (vector::norm(self.row(i)) - 1.0).abs() > NORM_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_normalizes() {
        let m = EmbeddingMatrix::from_rows(vec![vec![3.0, 4.0], vec![0.0, 2.0]]).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.dim(), 2);
        assert!(m.validate_normalized().is_none());
        assert!((m.row(0)[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidDimension {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_scores_against() {
        let m = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let scores = m.scores_against(&Vector::new(vec![1.0, 0.0]));
        assert!((scores[0] - 1.0).abs() < 1e-6);
        assert!(scores[1].abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch_scores_zero() {
        let m = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0]]).unwrap();
        let scores = m.scores_against(&Vector::new(vec![1.0, 0.0, 0.0]));
        assert_eq!(scores, vec![0.0]);
    }
}

//! Exhaustive in-memory cosine index.
//!
//! Vectors are stored in corpus order, so the ordinal returned by
//! [`SimilarityIndex::query`] is the position of the matching verse in the
//! [`Corpus`](crate::corpus::Corpus). The corpus is a few hundred verses,
//! so every query scans all vectors: `O(n × dims)`.

use crate::embedding::cosine_similarity;
use crate::error::RetrievalError;

/// The arg-max of a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    pub ordinal: usize,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f32,
}

/// Immutable set of equal-length vectors addressed by ordinal.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    vectors: Vec<Vec<f32>>,
    dims: usize,
}

impl SimilarityIndex {
    /// Build an index, keeping `vectors` in the given order.
    ///
    /// All vectors must share the length of the first one. An empty input
    /// yields an empty index with `dims() == 0`.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self, RetrievalError> {
        let dims = vectors.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
            return Err(RetrievalError::DimensionMismatch {
                expected: dims,
                got: bad.len(),
            });
        }
        Ok(Self { vectors, dims })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Vector stored at `ordinal`.
    pub fn vector(&self, ordinal: usize) -> Option<&[f32]> {
        self.vectors.get(ordinal).map(Vec::as_slice)
    }

    /// Find the stored vector most similar to `query`.
    ///
    /// Exact ties resolve to the lowest ordinal. Zero-magnitude vectors
    /// score `0.0` against everything.
    pub fn query(&self, query: &[f32]) -> Result<BestMatch, RetrievalError> {
        if self.vectors.is_empty() {
            return Err(RetrievalError::EmptyIndex);
        }
        if query.len() != self.dims {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dims,
                got: query.len(),
            });
        }

        let mut best = BestMatch {
            ordinal: 0,
            score: f32::NEG_INFINITY,
        };
        for (ordinal, v) in self.vectors.iter().enumerate() {
            let score = cosine_similarity(query, v);
            // Strict `>` keeps the earliest ordinal on ties.
            if score > best.score {
                best = BestMatch { ordinal, score };
            }
        }
        Ok(best)
    }
}

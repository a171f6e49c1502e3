//! Named failure modes of the retrieval pipeline.

/// Errors surfaced by corpus building and retrieval.
///
/// Per-record ingestion problems are not errors; they are reported as
/// [`SkipReason`](crate::normalize::SkipReason) values instead.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The query was empty or whitespace-only.
    #[error("query text is empty")]
    EmptyQuery,

    /// Retrieval was attempted against a corpus with no usable verses.
    #[error("corpus index is empty; no verses to match against")]
    EmptyIndex,

    /// The embedding provider could not be initialized.
    #[error("embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The embedding provider failed while embedding text.
    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Vector count does not line up with the corpus ordinals.
    #[error("corpus has {records} verses but {vectors} embeddings")]
    Misaligned { records: usize, vectors: usize },

    #[error("duplicate verse id: {0}")]
    DuplicateId(String),
}

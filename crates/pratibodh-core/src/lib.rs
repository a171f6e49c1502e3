//! # PratibodhAI Core
//!
//! Shared, I/O-free logic for PratibodhAI: verse models, corpus
//! normalization, the canonical corpus document, the similarity index,
//! the embedding trait, and the retrieval orchestrator.
//!
//! This crate contains no tokio, HTTP, filesystem I/O, or model runtime.
//! Reading files and loading embedding models is the application's job;
//! everything here operates on values handed in by the caller.
//!
//! # Build order
//!
//! ```text
//! raw JSON ─▶ normalize ─▶ Corpus ─▶ EmbeddingProvider::embed ─▶ SimilarityIndex
//!                                        │
//!                                        └──────────▶ CorpusIndex ─▶ Retriever::retrieve
//! ```

pub mod corpus;
pub mod embedding;
pub mod error;
pub mod index;
pub mod models;
pub mod normalize;
pub mod retrieve;

pub use corpus::{Corpus, CorpusFile, CorpusMeta};
pub use embedding::{cosine_similarity, EmbeddingProvider};
pub use error::RetrievalError;
pub use index::{BestMatch, SimilarityIndex};
pub use models::{RawVerse, Verse};
pub use normalize::{normalize, NormalizeOptions, NormalizeReport, SkipReason, SkippedRecord};
pub use retrieve::{CorpusIndex, RetrievalHit, Retriever};

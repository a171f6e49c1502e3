//! # PratibodhAI
//!
//! Reflective verse retrieval over the Bhagavad Gita. A user describes a
//! situation in plain language; PratibodhAI returns the single verse whose
//! meaning is closest, by cosine similarity of sentence embeddings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │  raw dump   │──▶│  normalize   │──▶│ Geeta.json   │
//! │ verse.json  │   │  (ingest)   │   │ (canonical)  │
//! └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                            │
//!                     ┌──────────────────────┘
//!                     ▼
//!              ┌──────────────┐   ┌──────────────┐
//!              │ embed corpus │──▶│  Retriever   │──▶ one verse
//!              │  (provider)  │   │ (cosine max) │
//!              └──────────────┘   └──────────────┘
//! ```
//!
//! The pure pieces (models, normalization, index, orchestration) live in
//! [`pratibodh_core`]. This crate adds configuration, embedding backends,
//! file I/O, and the `pratibodh` CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! pratibodh ingest data/verse.json          # write data/Geeta.json
//! pratibodh ask "I fear failing at my work"
//! pratibodh stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`embedding`] | Embedding backends (fastembed, Ollama, OpenAI, hash) |
//! | [`ingest`] | Raw dump → canonical corpus file |
//! | [`inspect`] | Shape of an upstream JSON dump |
//! | [`ask`] | Corpus loading and single-verse retrieval |
//! | [`stats`] | Corpus summary |

pub mod ask;
pub mod config;
pub mod embedding;
pub mod ingest;
pub mod inspect;
pub mod stats;

pub use pratibodh_core::{
    Corpus, CorpusFile, CorpusIndex, RetrievalError, RetrievalHit, Retriever, Verse,
};

//! The `ask` command: one query in, one verse out.
//!
//! Startup order is fixed: read the corpus file, construct the embedding
//! provider (loading model weights once), embed the whole corpus into a
//! [`CorpusIndex`], then answer the query through a [`Retriever`].

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use pratibodh_core::{Corpus, CorpusFile, CorpusIndex, RetrievalError, RetrievalHit, Retriever};

use crate::config::Config;
use crate::embedding::create_provider;

/// Read and parse a canonical corpus file.
pub fn load_corpus_file(path: &Path) -> Result<CorpusFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read corpus file: {} (run `pratibodh ingest` first)",
            path.display()
        )
    })?;
    CorpusFile::from_json(&content).with_context(|| format!("in {}", path.display()))
}

pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let corpus = load_corpus_file(path)?.into_corpus()?;
    tracing::info!(verses = corpus.len(), path = %path.display(), "corpus loaded");
    Ok(corpus)
}

/// Build a ready-to-query [`Retriever`] from configuration.
pub async fn open_retriever(config: &Config) -> Result<Retriever> {
    let corpus = load_corpus(&config.corpus.path)?;
    let provider = create_provider(&config.embedding).await?;
    let index = CorpusIndex::build(corpus, provider.as_ref()).await?;
    Ok(Retriever::new(provider, Arc::new(index)))
}

pub async fn run_ask(config: &Config, query: &str, json: bool) -> Result<()> {
    // Reject before paying for model load and corpus embedding.
    if query.trim().is_empty() {
        return Err(RetrievalError::EmptyQuery).context("Please enter your thoughts first");
    }

    let retriever = open_retriever(config).await?;
    let hit = retriever.retrieve(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hit)?);
    } else {
        print!("{}", render_hit(&config.corpus.label, &hit));
    }
    Ok(())
}

/// Human-readable verse card.
pub fn render_hit(label: &str, hit: &RetrievalHit<'_>) -> String {
    let v = hit.verse;
    let mut out = String::new();
    out.push_str(&format!("{} {}  (score {:.4})\n", label, v.reference, hit.score));
    out.push_str(&"=".repeat(40));
    out.push('\n');
    if !v.sanskrit.is_empty() {
        out.push('\n');
        out.push_str(&v.sanskrit);
        out.push('\n');
    }
    if !v.transliteration.is_empty() {
        out.push('\n');
        out.push_str(&v.transliteration);
        out.push('\n');
    }
    if !v.translation.is_empty() {
        out.push_str(&format!("\n\"{}\"\n", v.translation));
    }
    out.push_str(&format!("\n  {} → {}\n", v.speaker, v.audience));
    if !v.word_meanings.is_empty() {
        out.push_str("\nWord breakdown:\n");
        out.push_str(&v.word_meanings);
        out.push('\n');
    }
    out
}

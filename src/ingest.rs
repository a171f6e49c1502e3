//! Raw verse dump → canonical corpus file.
//!
//! Reads a JSON array of upstream verse entries, normalizes them with
//! [`pratibodh_core::normalize`], and writes the canonical
//! [`CorpusFile`]. Malformed entries are counted and logged, never fatal.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use pratibodh_core::normalize::{normalize, NormalizeOptions, NormalizeReport};
use pratibodh_core::CorpusFile;

use crate::config::Config;

/// Counts reported by [`run_ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub loaded: usize,
    pub written: usize,
    pub skipped: usize,
    pub chapters: usize,
    pub out: PathBuf,
}

/// Parse a raw dump. The top level must be a JSON array; its elements are
/// validated individually by the normalizer.
pub fn read_raw_verses(path: &Path) -> Result<Vec<serde_json::Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read raw verses: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse raw verses: {}", path.display()))?;
    match value {
        serde_json::Value::Array(items) => Ok(items),
        other => bail!(
            "Expected a JSON array of verses in {}, found {}",
            path.display(),
            json_type_name(&other)
        ),
    }
}

/// Normalize raw entries with the configured namespace.
pub fn normalize_raw(config: &Config, raw: &[serde_json::Value]) -> NormalizeReport {
    let options = NormalizeOptions {
        namespace: config.corpus.namespace.clone(),
    };
    let report = normalize(raw, &options);
    tracing::info!(
        kept = report.corpus.len(),
        skipped = report.skipped.len(),
        "normalized raw verses"
    );
    report
}

/// Write the canonical corpus file, creating parent directories.
pub fn write_corpus_file(path: &Path, file: &CorpusFile) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, file.to_json()?)
        .with_context(|| format!("Failed to write corpus file: {}", path.display()))
}

/// Full ingest: read, normalize, write. `out` defaults to `corpus.path`.
pub fn ingest(config: &Config, raw_path: &Path, out: Option<&Path>) -> Result<IngestSummary> {
    let raw = read_raw_verses(raw_path)?;
    tracing::info!(count = raw.len(), path = %raw_path.display(), "loaded raw verses");

    let report = normalize_raw(config, &raw);
    let file = CorpusFile::from_corpus(
        &report.corpus,
        &config.corpus.label,
        &config.corpus.language,
    );

    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.corpus.path.clone());
    write_corpus_file(&out, &file)?;

    Ok(IngestSummary {
        loaded: raw.len(),
        written: file.meta.total_verses,
        skipped: report.skipped.len(),
        chapters: file.meta.total_chapters,
        out,
    })
}

pub fn run_ingest(config: &Config, raw_path: &Path, out: Option<&Path>) -> Result<()> {
    let summary = ingest(config, raw_path, out)?;

    println!("ingest {}", raw_path.display());
    println!("  loaded verses: {}", summary.loaded);
    println!("  written verses: {}", summary.written);
    println!("  skipped: {}", summary.skipped);
    println!("  chapters: {}", summary.chapters);
    println!("  saved at: {}", summary.out.display());
    println!("ok");
    Ok(())
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

//! Corpus statistics.
//!
//! Summarizes the canonical corpus file: header metadata, file size, and a
//! per-chapter verse breakdown. Used by `pratibodh stats` to confirm that
//! an ingest produced what was expected.

use anyhow::Result;

use crate::ask::load_corpus_file;
use crate::config::Config;

/// Run the stats command: read the corpus file and print a summary.
pub fn run_stats(config: &Config) -> Result<()> {
    let path = &config.corpus.path;
    let file = load_corpus_file(path)?;
    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    let meta = file.meta.clone();
    let corpus = file.into_corpus()?;
    let counts = corpus.chapter_counts();

    println!("PratibodhAI — Corpus Stats");
    println!("==========================");
    println!();
    println!("  Corpus:      {}", path.display());
    println!("  Size:        {}", format_bytes(file_size));
    println!();
    println!("  Text:        {}", meta.text);
    println!("  Language:    {}", meta.language);
    println!("  Mode:        {}", meta.mode);
    println!("  Chapters:    {}", counts.len());
    println!("  Verses:      {}", corpus.len());
    if meta.total_verses != corpus.len() {
        println!(
            "  (header lists {} verses; {} usable)",
            meta.total_verses,
            corpus.len()
        );
    }

    if !counts.is_empty() {
        println!();
        println!("  By chapter:");
        println!("  {:<10} {:>6}   {}", "CHAPTER", "VERSES", "SPEAKER");
        println!("  {}", "-".repeat(40));
        for (chapter, count) in &counts {
            let speaker = corpus
                .iter()
                .find(|v| v.chapter == *chapter)
                .map(|v| v.speaker.as_str())
                .unwrap_or("");
            println!("  {:<10} {:>6}   {}", chapter, count, speaker);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

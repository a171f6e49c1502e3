//! # PratibodhAI CLI (`pratibodh`)
//!
//! ## Usage
//!
//! ```bash
//! pratibodh --config ./config/pratibodh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pratibodh ingest <raw.json>` | Normalize a raw verse dump into the canonical corpus file |
//! | `pratibodh inspect <file.json>` | Show the shape of a JSON dump |
//! | `pratibodh ask "<thoughts>"` | Retrieve the single most relevant verse |
//! | `pratibodh stats` | Summarize the canonical corpus file |
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pratibodh::config::{self, Config};
use pratibodh::{ask, ingest, inspect, stats};

/// PratibodhAI: describe what is on your mind, receive one verse of the
/// Bhagavad Gita that speaks to it.
#[derive(Parser)]
#[command(
    name = "pratibodh",
    about = "PratibodhAI — reflective verse retrieval over the Bhagavad Gita",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/pratibodh.toml`. When the file is absent,
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/pratibodh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw verse dump into the canonical corpus file.
    ///
    /// Malformed entries are skipped and counted; the run only fails if
    /// the input cannot be read or is not a JSON array.
    Ingest {
        /// Raw JSON array of verse entries.
        raw: PathBuf,

        /// Output path. Defaults to `[corpus].path`.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the type, length, first entry, and keys of a JSON file.
    Inspect {
        path: PathBuf,
    },

    /// Retrieve the verse most similar in meaning to your thoughts.
    Ask {
        /// Free-text description of your situation.
        query: String,

        /// Print the hit as JSON instead of a verse card.
        #[arg(long)]
        json: bool,
    },

    /// Summarize the canonical corpus file.
    Stats,
}

/// Load config if the file exists; otherwise fall back to defaults.
/// A file that exists but fails to parse or validate is an error.
fn resolve_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { raw, out } => {
            let cfg = resolve_config(&cli.config)?;
            ingest::run_ingest(&cfg, &raw, out.as_deref())?;
        }
        Commands::Inspect { path } => {
            inspect::run_inspect(&path)?;
        }
        Commands::Ask { query, json } => {
            let cfg = resolve_config(&cli.config)?;
            ask::run_ask(&cfg, &query, json).await?;
        }
        Commands::Stats => {
            let cfg = resolve_config(&cli.config)?;
            stats::run_stats(&cfg)?;
        }
    }

    Ok(())
}

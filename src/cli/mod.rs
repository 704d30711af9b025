//! Command-line interface for textanchor.
//!
//! Provides commands for capturing anchors, verifying and relocating them
//! after their documents change, and inspecting the anchor store.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::anchor::Strategy;

pub mod anchors;

/// textanchor - Robust text anchoring
#[derive(Parser, Debug)]
#[command(name = "textanchor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture an anchor for a span of a document
    Capture {
        /// Document to anchor into
        document: PathBuf,

        /// Start character offset (inclusive)
        #[arg(long)]
        start: usize,

        /// End character offset (exclusive)
        #[arg(long)]
        end: usize,

        /// Checksum algorithm (md5, sha1, sha256, length)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Context window in characters
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Check whether an anchor's document is unchanged since capture
    Verify {
        /// Anchor ID (or unique prefix)
        id: String,
    },

    /// Relocate an anchor in the current version of its document
    Resolve {
        /// Anchor ID (or unique prefix)
        id: String,

        /// Relocation strategy (defaults to the configured one)
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// Capture fresh evidence at the new location, superseding the old anchor
        #[arg(long)]
        reanchor: bool,
    },

    /// Revalidate every live anchor
    Revalidate {
        /// Relocation strategy (defaults to the configured one)
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,
    },

    /// Show an anchor and the text it currently points at
    Show {
        /// Anchor ID (or unique prefix)
        id: String,
    },

    /// List anchors
    List {
        /// Include superseded and removed anchors
        #[arg(short, long)]
        all: bool,
    },

    /// Remove an anchor
    Remove {
        /// Anchor ID (or unique prefix)
        id: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Capture {
                document,
                start,
                end,
                algorithm,
                window,
            } => anchors::execute_capture(&document, start, end, algorithm.as_deref(), window).await,
            Commands::Verify { id } => anchors::execute_verify(&id).await,
            Commands::Resolve {
                id,
                strategy,
                reanchor,
            } => anchors::execute_resolve(&id, strategy, reanchor).await,
            Commands::Revalidate { strategy } => anchors::execute_revalidate(strategy).await,
            Commands::Show { id } => anchors::execute_show(&id).await,
            Commands::List { all } => anchors::execute_list(all),
            Commands::Remove { id } => anchors::execute_remove(&id),
            Commands::Config => execute_config(),
        }
    }
}

/// Print the resolved configuration
fn execute_config() -> Result<()> {
    let config = crate::config::config()?;

    println!("Home:        {}", config.home.display());
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!("Checksum:    {}", config.checksum);
    println!("Strategy:    {}", config.strategy);
    println!();
    println!("Anchoring:");
    println!("  window_size:        {}", config.anchoring.window_size);
    println!("  percent_storage:    {}", config.anchoring.percent_storage);
    println!("  fallback_tolerance: {}", config.anchoring.fallback_tolerance);
    println!("  max_shingle_size:   {}", config.anchoring.max_shingle_size);
    println!("  min_shingle_hits:   {}", config.anchoring.min_shingle_hits);

    Ok(())
}

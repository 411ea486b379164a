//! Command-line interface wiring for warc-linker.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod link;
pub mod mentions;
pub mod score;
pub mod search;
pub mod sparql;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Entity linking over web-crawl archives", long_about = None)]
pub struct Cli {
    /// Stderr verbosity (debug, info, warning, error).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Log file path; overrides LOG_FILE.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Fold global flags into the loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(level) = &self.log_level {
            settings.logging.stream_level = level.clone();
        }
        if let Some(file) = &self.log_file {
            settings.logging.file = Some(file.clone());
        }
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Link(args) => link::run(args, settings).await,
            Commands::Search(args) => search::run(args, settings).await,
            Commands::Sparql(args) => sparql::run(args, settings).await,
            Commands::Mentions(args) => mentions::run(args, settings).await,
            Commands::Score(args) => score::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Link the mentions of every document in WARC archives.
    Link(link::Args),
    /// Query the search index for candidates of a mention.
    Search(search::Args),
    /// Run a raw SPARQL query against the knowledge base.
    Sparql(sparql::Args),
    /// Print the mentions recognized in WARC archives.
    Mentions(mentions::Args),
    /// Score candidates from a JSON fixture without network access.
    Score(score::Args),
}

//! CLI entry-point for inspecting recognized mentions.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::{html, warc},
    nlp,
};

/// Args for the `mentions` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// WARC file or directory of archives.
    pub path: PathBuf,
    #[arg(long)]
    pub max_records: Option<usize>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let max_records = args.max_records.or(settings.max_records);
    let pipeline = nlp::load_pipeline();
    for archive in warc::collect_archives(&args.path)? {
        info!(archive = %archive.display(), "reading archive");
        for document in warc::read_documents(&archive, max_records)? {
            let document = document?;
            let text = html::visible_text(&document.html);
            for mention in pipeline.recognizer.recognize(&text) {
                println!(
                    "{}\t{}\t{}",
                    document.id,
                    mention.text,
                    mention.label.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

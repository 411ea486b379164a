//! CLI entry-point for the full linking pipeline.

use std::{io, path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::{
        kb::KbClient,
        search::{LookupStrategy, SearchClient},
        warc,
    },
    linking::pipeline::{link_archives, Linker},
    nlp,
};

/// Args for the `link` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// WARC file or directory of `.warc`/`.warc.gz` archives.
    pub path: PathBuf,
    /// Search index `host:port`.
    #[arg(long)]
    pub es_domain: Option<String>,
    /// Knowledge base `host:port`.
    #[arg(long)]
    pub kb_domain: Option<String>,
    /// How search hits become candidates.
    #[arg(long, default_value = "all", value_enum)]
    pub strategy: LookupStrategy,
    /// Override the term similarity threshold.
    #[arg(long)]
    pub threshold: Option<f64>,
    /// Stop after this many records per archive.
    #[arg(long)]
    pub max_records: Option<usize>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    if let Some(domain) = args.es_domain {
        settings.es_domain = domain;
    }
    if let Some(domain) = args.kb_domain {
        settings.kb_domain = domain;
    }
    if let Some(threshold) = args.threshold {
        settings.similarity_threshold = threshold;
    }
    if args.max_records.is_some() {
        settings.max_records = args.max_records;
    }

    let archives = warc::collect_archives(&args.path)?;
    if archives.is_empty() {
        bail!("no WARC archives found under {}", args.path.display());
    }
    info!(archives = archives.len(), es = %settings.es_domain, kb = %settings.kb_domain, "starting link run");

    let linker = Linker::new(
        Arc::new(SearchClient::new(&settings, args.strategy)?),
        Arc::new(KbClient::new(&settings)?),
        nlp::load_pipeline(),
        settings.similarity_threshold,
    );
    let mut stdout = io::stdout().lock();
    link_archives(&settings, &archives, &linker, &mut stdout).await?;
    Ok(())
}

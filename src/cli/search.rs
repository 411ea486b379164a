//! CLI entry-point for ad-hoc candidate lookups.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::Settings,
    data::search::{LookupStrategy, SearchClient},
};

/// Args for the `search` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Mention text, e.g. "Vrije University".
    pub query: String,
    #[arg(long)]
    pub es_domain: Option<String>,
    #[arg(long, default_value = "all", value_enum)]
    pub strategy: LookupStrategy,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    if let Some(domain) = args.es_domain {
        settings.es_domain = domain;
    }
    let client = SearchClient::new(&settings, args.strategy)?;
    for (kb_id, labels) in client.search(&args.query).await? {
        let labels: Vec<_> = labels.into_iter().collect();
        println!("{kb_id}\t{}", labels.join(" | "));
    }
    Ok(())
}

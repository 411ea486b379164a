//! CLI entry-point for raw knowledge-base queries.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, data::kb::KbClient};

/// Args for the `sparql` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// SPARQL query text.
    pub query: String,
    #[arg(long)]
    pub kb_domain: Option<String>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    if let Some(domain) = args.kb_domain {
        settings.kb_domain = domain;
    }
    let client = KbClient::new(&settings)?;
    let response = client.raw_query(&args.query).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

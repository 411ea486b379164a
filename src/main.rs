//! Entry point wiring CLI dispatch to the linking pipeline.

use anyhow::Result;
use tracing::{info, instrument};
use warc_linker::{cli::Cli, config::Settings, logging};

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    let mut settings = Settings::load()?;
    let cli = Cli::parse();
    cli.apply_overrides(&mut settings);
    logging::init_tracing(&settings.logging)?;

    info!(?cli, "starting command");
    cli.dispatch(settings).await
}

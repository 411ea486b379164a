//! Structured logging bootstrap using `tracing`.

use std::{fs::OpenOptions, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{level_filters::LevelFilter, Dispatch};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::LinkError;

/// Verbosity and destination of the two log sinks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogOptions {
    /// Level printed to stderr; `RUST_LOG` wins when set.
    pub stream_level: String,
    /// Level written to `file`.
    pub file_level: String,
    /// Log file; `None` disables the file sink.
    pub file: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            stream_level: "error".to_string(),
            file_level: "info".to_string(),
            file: Some(PathBuf::from("linker.log")),
        }
    }
}

/// Map a user-facing level name onto a tracing filter.
pub fn parse_level(level: &str) -> Result<LevelFilter, LinkError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warning" | "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        other => Err(LinkError::InvalidLogLevel(other.to_string())),
    }
}

/// Build a dispatcher writing to stderr and, optionally, to a log file.
pub fn build_dispatch(options: &LogOptions) -> Result<Dispatch> {
    let stream_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::default().add_directive(parse_level(&options.stream_level)?.into()),
    };
    let timer = fmt::time::UtcTime::rfc_3339();

    let stream_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(timer.clone())
        .with_level(true)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(stream_filter);

    let file_layer = match &options.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(timer)
                    .with_level(true)
                    .with_filter(parse_level(&options.file_level)?),
            )
        }
        None => None,
    };

    let registry = tracing_subscriber::registry()
        .with(stream_layer)
        .with(file_layer);
    Ok(Dispatch::new(registry))
}

/// Install the dispatcher globally unless a subscriber is already set.
pub fn init_tracing(options: &LogOptions) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let dispatch = build_dispatch(options)?;
    tracing::dispatcher::set_global_default(dispatch).context("installing tracing dispatcher")?;

    tracing::debug!(?options, "tracing initialised");
    Ok(())
}

//! Runtime configuration utilities for warc-linker.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

use crate::{linking::similarity::DEFAULT_THRESHOLD, logging::LogOptions};

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Search index `host:port`.
    pub es_domain: String,
    /// Knowledge-base SPARQL endpoint `host:port`.
    pub kb_domain: String,
    /// Hits requested per mention.
    pub search_size: usize,
    /// Candidates kept by the top-scored lookup strategy.
    pub top_candidates: usize,
    /// Term pairs must score strictly above this to count as matching.
    pub similarity_threshold: f64,
    /// Attempts per knowledge-base query when the response fails to parse.
    pub kb_max_attempts: usize,
    pub kb_retry_delay_ms: u64,
    pub http_timeout_secs: u64,
    /// Stop reading each archive after this many records.
    pub max_records: Option<usize>,
    /// Root folder for link tables and run summaries.
    pub outputs_dir: PathBuf,
    pub logging: LogOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            es_domain: "localhost:9200".to_string(),
            kb_domain: "localhost:9090".to_string(),
            search_size: 20,
            top_candidates: 10,
            similarity_threshold: DEFAULT_THRESHOLD,
            kb_max_attempts: 3,
            kb_retry_delay_ms: 1000,
            http_timeout_secs: 30,
            max_records: None,
            outputs_dir: PathBuf::from("./outputs"),
            logging: LogOptions::default(),
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let logging = LogOptions {
            stream_level: env::var("LOG_STREAM_LEVEL")
                .unwrap_or(defaults.logging.stream_level.clone()),
            file_level: env::var("LOG_FILE_LEVEL").unwrap_or(defaults.logging.file_level.clone()),
            file: match env::var("LOG_FILE") {
                Ok(path) if path.trim().is_empty() => None,
                Ok(path) => Some(PathBuf::from(path)),
                Err(_) => defaults.logging.file.clone(),
            },
        };

        Ok(Self {
            es_domain: env::var("ES_DOMAIN").unwrap_or(defaults.es_domain),
            kb_domain: env::var("KB_DOMAIN").unwrap_or(defaults.kb_domain),
            search_size: parsed("SEARCH_SIZE")?.unwrap_or(defaults.search_size),
            top_candidates: parsed("TOP_CANDIDATES")?.unwrap_or(defaults.top_candidates),
            similarity_threshold: parsed("SIMILARITY_THRESHOLD")?
                .unwrap_or(defaults.similarity_threshold),
            kb_max_attempts: parsed("KB_MAX_ATTEMPTS")?.unwrap_or(defaults.kb_max_attempts),
            kb_retry_delay_ms: parsed("KB_RETRY_DELAY_MS")?.unwrap_or(defaults.kb_retry_delay_ms),
            http_timeout_secs: parsed("HTTP_TIMEOUT_SECS")?.unwrap_or(defaults.http_timeout_secs),
            max_records: parsed("MAX_RECORDS")?,
            outputs_dir: env::var("OUTPUTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.outputs_dir),
            logging,
        })
    }

    pub fn kb_retry_delay(&self) -> Duration {
        Duration::from_millis(self.kb_retry_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Create the outputs folder if needed.
    pub fn ensure_outputs_dir(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.outputs_dir).context("creating outputs dir")
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn parsed<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("parsing {key}={raw}")),
        Err(_) => Ok(None),
    }
}

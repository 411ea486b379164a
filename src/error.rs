//! Error taxonomy shared by the linking core and its collaborators.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures surfaced by scoring, archive reading and the HTTP collaborators.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Similarity scoring was asked to normalise by an empty context.
    #[error("cannot score candidates against an empty document context")]
    EmptyContext,

    /// Transport-level failure or non-success status from an external service.
    #[error("{service} unavailable: {source}")]
    Upstream {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered, but the payload could not be understood.
    #[error("malformed response from {service}: {detail}")]
    MalformedResponse {
        service: &'static str,
        detail: String,
    },

    #[error("knowledge-base identifier `{0}` is too short to map to a resource")]
    InvalidKbId(String),

    #[error("failed to read archive {path:?}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown log level `{0}` (expected debug, info, warning or error)")]
    InvalidLogLevel(String),
}

impl LinkError {
    /// Whether a retry could plausibly yield a different answer.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }
}

pub type LinkResult<T> = Result<T, LinkError>;

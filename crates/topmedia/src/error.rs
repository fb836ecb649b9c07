//! Error types for the core engine.
//!
//! None of these abort a batch. [`ResolutionError`] is turned into a
//! fallback by the normalizer; [`RulesError`] only surfaces while loading a
//! rules document, before any row is processed.

use thiserror::Error;

/// Why an outbound resolution request produced no final URL.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to '{url}' timed out")]
    Timeout { url: String },

    #[error("could not connect to '{url}': {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A 3xx left unfollowed, or the redirect limit was hit. `status` is set
    /// when the final response itself was the redirect.
    #[error("redirect from '{url}' was not followed")]
    UnfollowedRedirect { url: String, status: Option<u16> },

    #[error("request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ResolutionError {
    /// Classify a transport error from `reqwest`.
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::Connect { url, source: err }
        } else if err.is_redirect() {
            Self::UnfollowedRedirect {
                status: err.status().map(|s| s.as_u16()),
                url,
            }
        } else if err.is_builder() {
            Self::InvalidUrl {
                reason: err.to_string(),
                url,
            }
        } else {
            Self::Request { url, source: err }
        }
    }

    /// Short machine-friendly tag used in logs and run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Client(_) => "client",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::Timeout { .. } => "timeout",
            Self::Connect { .. } => "connect",
            Self::UnfollowedRedirect { .. } => "unfollowed_redirect",
            Self::Request { .. } => "request",
        }
    }
}

/// Problems with a rules document.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid rules: {0}")]
    Invalid(String),
}

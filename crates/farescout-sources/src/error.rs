//! Source client errors.

use thiserror::Error;

/// Airline source client errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The upstream API answered with a non-200 status.
    #[error("upstream responded with status {status} for {url}")]
    Upstream { status: u16, url: String },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("upstream request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded as JSON.
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Transport(e.to_string())
    }
}

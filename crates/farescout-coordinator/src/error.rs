//! Coordinator client errors.

use thiserror::Error;

/// Coordinator client errors.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The service answered with a non-200 status.
    #[error("coordinator responded with status {status} for {url}")]
    Unavailable { status: u16, url: String },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("coordinator request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("failed to decode coordinator response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CoordinatorError {
    fn from(e: reqwest::Error) -> Self {
        CoordinatorError::Transport(e.to_string())
    }
}

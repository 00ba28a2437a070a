//! Browser automation errors.

use thiserror::Error;

/// Browser automation errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to reach the browser's debugging endpoint.
    #[error("browser not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    BrowserNotAvailable(String),

    /// WebSocket connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// WebSocket transport error after connect.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Attaching a debug session to a tab failed (tab gone, or debugging
    /// disallowed because another client is attached).
    #[error("failed to attach to tab: {0}")]
    Attach(String),

    /// The browser rejected a protocol command.
    #[error("protocol command failed: {message} (code {code})")]
    Command { code: i64, message: String },

    /// Navigation was refused by the page.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// A captured response body was not valid UTF-8/JSON.
    #[error("failed to decode response body: {0}")]
    BodyDecode(String),

    /// A command or wait exceeded its deadline.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The session's connection is gone.
    #[error("debug session closed")]
    SessionClosed,

    /// A well-formed reply was missing an expected field.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Message serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for BrowserError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        BrowserError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for BrowserError {
    fn from(e: reqwest::Error) -> Self {
        BrowserError::BrowserNotAvailable(e.to_string())
    }
}

//! Worker errors.

use thiserror::Error;

use farescout_browser::BrowserError;
use farescout_coordinator::CoordinatorError;
use farescout_sources::SourceError;

/// Anything that can fail while processing one job. The worker loop treats
/// every variant the same way: log it, spend one unit of error budget, move
/// on.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The coordinator handed out a job kind this worker does not know.
    #[error("unknown job type {0}")]
    UnknownJobType(String),

    /// A job document is missing a field its kind requires.
    #[error("job {job_id} is missing required field `{field}`")]
    MissingField { job_id: String, field: &'static str },

    /// A job carried an unparseable date.
    #[error("invalid date in job: {0}")]
    InvalidDate(String),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// Result payload could not be encoded for storage.
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

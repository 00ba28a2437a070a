//! Result envelopes sent to the coordinator's storage endpoint.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A scrape result bound for the coordinator.
///
/// Immutable once constructed; sent exactly once per job. The timestamp is
/// taken when the envelope is built, which callers do at response-receipt time
/// so it reflects data freshness rather than request start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Storage dataset the payload belongs to (e.g. "ryanair", "wizzair").
    pub dataset_name: String,
    /// Opaque scrape payload.
    pub payload: Value,
    /// RFC 3339 timestamp of response receipt.
    pub fetch_date: String,
}

impl ResultEnvelope {
    /// Wrap a payload for the given dataset, stamping it with the current time.
    pub fn new(dataset_name: impl Into<String>, payload: Value) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            payload,
            fetch_date: Utc::now().to_rfc3339(),
        }
    }
}

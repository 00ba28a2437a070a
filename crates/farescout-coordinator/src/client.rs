//! HTTP client for the coordination service.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use farescout_core::{Job, ResultEnvelope};

use crate::error::CoordinatorError;

/// Per-request timeout. The upstream service is local-network; anything
/// slower than this is treated as a failed attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Seam between the worker loop and the coordination service.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Ask for the next job. `Ok(None)` means the queue is empty, which is
    /// not an error and must not count against the worker's error budget.
    async fn fetch_job(&self) -> Result<Option<Job>, CoordinatorError>;

    /// Mark a job as fully processed.
    async fn complete_job(&self, job_id: &str) -> Result<(), CoordinatorError>;

    /// Store a scrape result under its dataset.
    async fn save_result(&self, envelope: &ResultEnvelope) -> Result<(), CoordinatorError>;

    /// Store the available flight dates for a route.
    async fn save_flight_dates(
        &self,
        src_code: &str,
        dst_code: &str,
        dates: &Value,
    ) -> Result<(), CoordinatorError>;
}

/// REST/JSON client for the coordination service.
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoordinatorClient {
    /// Create a client for the service at `base_url` (no trailing slash
    /// required).
    pub fn new(base_url: impl Into<String>) -> Result<Self, CoordinatorError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST a JSON body and fail on any non-200 status.
    async fn post(&self, path: &str, body: Value) -> Result<reqwest::Response, CoordinatorError> {
        let url = self.url(path);
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if status.as_u16() != 200 {
            return Err(CoordinatorError::Unavailable {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Coordinator for CoordinatorClient {
    async fn fetch_job(&self) -> Result<Option<Job>, CoordinatorError> {
        let url = self.url("scheduler/fetch_job");
        let response = self.http.post(&url).body("").send().await?;
        let status = response.status();
        if status.as_u16() != 200 {
            return Err(CoordinatorError::Unavailable {
                status: status.as_u16(),
                url,
            });
        }
        // The service answers `null` when the queue is empty.
        let job: Option<Job> = serde_json::from_slice(&response.bytes().await?)?;
        if let Some(job) = &job {
            debug!(job_id = %job.id, kind = %job.kind, "fetched job");
        }
        Ok(job)
    }

    async fn complete_job(&self, job_id: &str) -> Result<(), CoordinatorError> {
        self.post("scheduler/complete_job", json!({ "job_id": job_id }))
            .await?;
        debug!(job_id, "job completed");
        Ok(())
    }

    async fn save_result(&self, envelope: &ResultEnvelope) -> Result<(), CoordinatorError> {
        self.post(
            "storage/save_result",
            json!({ "dataset_name": envelope.dataset_name, "result": envelope.payload }),
        )
        .await?;
        debug!(dataset_name = %envelope.dataset_name, fetch_date = %envelope.fetch_date,
            "result saved");
        Ok(())
    }

    async fn save_flight_dates(
        &self,
        src_code: &str,
        dst_code: &str,
        dates: &Value,
    ) -> Result<(), CoordinatorError> {
        self.post(
            "scheduler/save_flight_dates",
            json!({ "src_code": src_code, "dst_code": dst_code, "dates": dates }),
        )
        .await?;
        debug!(src_code, dst_code, "flight dates saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

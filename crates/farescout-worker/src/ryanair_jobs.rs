//! Handlers for the Ryanair API job kinds.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use farescout_coordinator::Coordinator;
use farescout_core::{FlightQueryOptions, Job, ResultEnvelope, kind};
use farescout_sources::RyanairClient;

use crate::dispatch::JobHandler;
use crate::error::WorkerError;

/// Dataset the flight-detail results are stored under.
const DATASET: &str = "ryanair";

/// Executes `QueryDatesJob` and `QueryFlightsJob` against the Ryanair API
/// and reports the results back to the coordinator.
pub struct RyanairJobs {
    coordinator: Arc<dyn Coordinator>,
    client: RyanairClient,
}

impl RyanairJobs {
    pub fn new(coordinator: Arc<dyn Coordinator>, client: RyanairClient) -> Self {
        Self {
            coordinator,
            client,
        }
    }

    async fn query_dates(&self, job: &Job) -> Result<(), WorkerError> {
        let dates = self
            .client
            .query_available_dates(&job.src_code, &job.dst_code)
            .await?;
        self.coordinator
            .save_flight_dates(&job.src_code, &job.dst_code, &dates.dates)
            .await?;
        info!(job_id = %job.id, src = %job.src_code, dst = %job.dst_code,
            "flight dates reported");
        Ok(())
    }

    async fn query_flights(&self, job: &Job) -> Result<(), WorkerError> {
        let date = job.date.as_deref().ok_or(WorkerError::MissingField {
            job_id: job.id.clone(),
            field: "date",
        })?;
        let opts = FlightQueryOptions {
            days_before: job.days_before.unwrap_or(2),
            days_after: job.days_after.unwrap_or(2),
            ..FlightQueryOptions::default()
        };
        let details = self
            .client
            .query_flight_details(&job.src_code, &job.dst_code, date, opts)
            .await?;
        let envelope = ResultEnvelope::new(DATASET, serde_json::to_value(&details)?);
        self.coordinator.save_result(&envelope).await?;
        info!(job_id = %job.id, src = %job.src_code, dst = %job.dst_code, date,
            "flight details saved");
        Ok(())
    }
}

#[async_trait]
impl JobHandler for RyanairJobs {
    async fn run(&self, job: &Job) -> Result<(), WorkerError> {
        match job.kind.as_str() {
            kind::QUERY_DATES => self.query_dates(job).await,
            kind::QUERY_FLIGHTS => self.query_flights(job).await,
            other => Err(WorkerError::UnknownJobType(other.to_string())),
        }
    }
}

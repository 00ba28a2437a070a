//! Handlers for the Wizzair API job kinds.
//!
//! Same job kinds as the Ryanair handler, different upstream. Which one backs
//! the API jobs is a deployment choice; the search endpoint here only works
//! while the configured challenge headers are fresh.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use farescout_coordinator::Coordinator;
use farescout_core::{FlightQueryOptions, Job, ResultEnvelope, kind};
use farescout_sources::WizzairClient;

use crate::dispatch::JobHandler;
use crate::error::WorkerError;
use crate::scrape_jobs::shift_date;

const DATASET: &str = "wizzair";

/// Width of the date window queried when a job does not carry one.
const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Executes `QueryDatesJob` and `QueryFlightsJob` against the Wizzair API.
pub struct WizzairJobs {
    coordinator: Arc<dyn Coordinator>,
    client: WizzairClient,
}

impl WizzairJobs {
    pub fn new(coordinator: Arc<dyn Coordinator>, client: WizzairClient) -> Self {
        Self {
            coordinator,
            client,
        }
    }

    async fn query_dates(&self, job: &Job) -> Result<(), WorkerError> {
        // The flight-dates endpoint wants an explicit window; jobs without one
        // get a window starting today.
        let from = match job.start_date.as_deref() {
            Some(start) => start.to_string(),
            None => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        };
        let to = shift_date(&from, job.days.unwrap_or(DEFAULT_WINDOW_DAYS))?;
        let dates = self
            .client
            .query_available_dates(&job.src_code, &job.dst_code, &from, &to)
            .await?;
        self.coordinator
            .save_flight_dates(&job.src_code, &job.dst_code, &dates.dates)
            .await?;
        info!(job_id = %job.id, src = %job.src_code, dst = %job.dst_code, from, to,
            "flight dates reported");
        Ok(())
    }

    async fn query_flights(&self, job: &Job) -> Result<(), WorkerError> {
        let date = job.date.as_deref().ok_or(WorkerError::MissingField {
            job_id: job.id.clone(),
            field: "date",
        })?;
        let search = self
            .client
            .search_flight_details(
                &job.src_code,
                &job.dst_code,
                date,
                FlightQueryOptions::default(),
            )
            .await?;
        let envelope = ResultEnvelope::new(DATASET, serde_json::to_value(&search)?);
        self.coordinator.save_result(&envelope).await?;
        info!(job_id = %job.id, src = %job.src_code, dst = %job.dst_code, date,
            "flight search saved");
        Ok(())
    }
}

#[async_trait]
impl JobHandler for WizzairJobs {
    async fn run(&self, job: &Job) -> Result<(), WorkerError> {
        match job.kind.as_str() {
            kind::QUERY_DATES => self.query_dates(job).await,
            kind::QUERY_FLIGHTS => self.query_flights(job).await,
            other => Err(WorkerError::UnknownJobType(other.to_string())),
        }
    }
}

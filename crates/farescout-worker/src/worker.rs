//! The polling loop.

use std::sync::Arc;

use tracing::{debug, info, warn};

use farescout_coordinator::Coordinator;
use farescout_core::pacing::sleep_jittered;

use crate::budget::ErrorBudget;
use crate::config::WorkerConfig;
use crate::dispatch::JobHandler;
use crate::error::WorkerError;

/// Fetch-dispatch-complete loop with a bounded failure allowance.
///
/// Each iteration asks the coordinator for a job, runs it through the
/// handler, and reports completion. Any error along the way spends one unit
/// of [`ErrorBudget`]; an empty queue does not. Two jittered pauses separate
/// iterations so polling never settles into a fixed cadence.
pub struct JobWorker {
    coordinator: Arc<dyn Coordinator>,
    handler: Arc<dyn JobHandler>,
    config: WorkerConfig,
}

impl JobWorker {
    pub fn new(
        coordinator: Arc<dyn Coordinator>,
        handler: Arc<dyn JobHandler>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            coordinator,
            handler,
            config,
        }
    }

    /// Run until the error budget is exhausted.
    pub async fn run(&self) {
        info!(
            error_budget = self.config.error_budget,
            startup_delay_secs = self.config.startup_delay_secs,
            "worker starting"
        );
        tokio::time::sleep(self.config.startup_delay()).await;

        let mut budget = ErrorBudget::new(self.config.error_budget);
        while !budget.is_exhausted() {
            match self.process_one().await {
                Ok(Some(job_id)) => info!(job_id, "job processed"),
                Ok(None) => debug!("no job available"),
                Err(e) => {
                    budget.spend();
                    warn!(error = %e, remaining = budget.remaining(), "job attempt failed");
                }
            }
            sleep_jittered(self.config.pace_base(), self.config.pace_spread()).await;
            sleep_jittered(self.config.pace_base(), self.config.pace_spread()).await;
        }
        info!("error budget exhausted, worker stopping");
    }

    /// One loop iteration: fetch, dispatch, complete.
    ///
    /// `Ok(None)` means the queue was empty. Completion is only reported
    /// after the handler succeeds, so a failed job stays claimable.
    async fn process_one(&self) -> Result<Option<String>, WorkerError> {
        let Some(job) = self.coordinator.fetch_job().await? else {
            return Ok(None);
        };
        info!(job_id = %job.id, kind = %job.kind, src = %job.src_code, dst = %job.dst_code,
            "executing job");
        self.handler.run(&job).await?;
        self.coordinator.complete_job(&job.id).await?;
        Ok(Some(job.id))
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;

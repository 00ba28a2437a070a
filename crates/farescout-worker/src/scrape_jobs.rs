//! Handler for `BrowserScrapeJob`: walk a live booking site through a
//! debugger-driven browser and capture the API traffic it generates.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use farescout_browser::{
    CaptureConfig, CapturedExchange, CdpClient, LOAD_TIMEOUT, NetworkCapture, TabSession,
    run_capture,
};
use farescout_coordinator::Coordinator;
use farescout_core::pacing::sleep_jittered;
use farescout_core::{Job, ResultEnvelope};

use crate::error::WorkerError;

/// Dataset the captured exchanges are stored under.
const DATASET: &str = "wizzair";

/// Browser-scrape settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Remote-debugging endpoint of the browser to drive.
    pub cdp_endpoint: String,
    /// Base URL of the booking site whose select-flight pages are walked.
    pub booking_base_url: String,
    /// URL substrings of the API responses worth capturing.
    pub url_allowlist: Vec<String>,
    /// Base of the jittered pause between page navigations.
    pub page_pace_base_secs: f64,
    /// Upper bound of the random jitter added to the page pause.
    pub page_pace_spread_secs: f64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            cdp_endpoint: "http://localhost:9222".to_string(),
            booking_base_url: "https://www.wizzair.com".to_string(),
            url_allowlist: vec![
                "Api/asset/map".to_string(),
                "Api/search/flightDates".to_string(),
                "Api/search/search".to_string(),
            ],
            page_pace_base_secs: 4.0,
            page_pace_spread_secs: 3.0,
        }
    }
}

impl ScrapeConfig {
    fn page_pace_base(&self) -> Duration {
        Duration::from_secs_f64(self.page_pace_base_secs)
    }

    fn page_pace_spread(&self) -> Duration {
        Duration::from_secs_f64(self.page_pace_spread_secs)
    }
}

/// Executes `BrowserScrapeJob`: opens the route's select-flight page, steps
/// through each date in the job's window, and saves every allow-listed API
/// exchange the pages trigger.
pub struct BrowserScrape {
    coordinator: Arc<dyn Coordinator>,
    config: ScrapeConfig,
}

impl BrowserScrape {
    pub fn new(coordinator: Arc<dyn Coordinator>, config: ScrapeConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    fn booking_url(&self, src_code: &str, dst_code: &str, date: &str) -> String {
        format!(
            "{}/en-gb/booking/select-flight/{}/{}/{}/null/1/0/0/null",
            self.config.booking_base_url.trim_end_matches('/'),
            src_code,
            dst_code,
            date,
        )
    }

    /// Step through the job's date window. The first date is already loading
    /// when this is called; each subsequent date is a fresh navigation.
    async fn walk_dates(
        &self,
        session: &TabSession,
        job: &Job,
        start_date: &str,
        days: u32,
    ) -> Result<(), WorkerError> {
        session.enable_domain("Page").await?;
        session.enable_domain("Network").await?;
        session.wait_for_load(LOAD_TIMEOUT).await?;
        for offset in 1..days {
            sleep_jittered(
                self.config.page_pace_base(),
                self.config.page_pace_spread(),
            )
            .await;
            let date = shift_date(start_date, offset)?;
            let url = self.booking_url(&job.src_code, &job.dst_code, &date);
            session.navigate(&url).await?;
            session.wait_for_load(LOAD_TIMEOUT).await?;
        }
        // Let trailing API responses land before tearing the session down.
        sleep_jittered(
            self.config.page_pace_base(),
            self.config.page_pace_spread(),
        )
        .await;
        Ok(())
    }
}

#[async_trait]
impl crate::dispatch::JobHandler for BrowserScrape {
    async fn run(&self, job: &Job) -> Result<(), WorkerError> {
        let start_date = job.start_date.as_deref().ok_or(WorkerError::MissingField {
            job_id: job.id.clone(),
            field: "start_date",
        })?;
        let days = job.days.unwrap_or(1);

        let client = CdpClient::connect(&self.config.cdp_endpoint).await?;
        let first_url = self.booking_url(&job.src_code, &job.dst_code, start_date);
        let session = client.open_tab(&first_url).await?;

        let Some(events) = session.take_network_events() else {
            return Err(WorkerError::Browser(
                farescout_browser::BrowserError::SessionClosed,
            ));
        };
        let capture = NetworkCapture::new(CaptureConfig::new(self.config.url_allowlist.clone()));
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let capture_task = tokio::spawn(run_capture(session.clone(), events, capture, out_tx));
        let saver = tokio::spawn(save_exchanges(self.coordinator.clone(), out_rx));

        let outcome = self.walk_dates(&session, job, start_date, days).await;

        // Detach closes the session's event stream, which winds down the
        // capture task and, once its output drains, the saver.
        session.detach().await;
        let _ = capture_task.await;
        let (saved, save_err) = match saver.await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "saver task failed");
                (0, None)
            }
        };
        if let Err(e) = client.close_tab(session.target_id()).await {
            warn!(error = %e, target_id = %session.target_id(), "failed to close tab");
        }
        info!(job_id = %job.id, src = %job.src_code, dst = %job.dst_code,
            days, saved, "browser scrape finished");
        outcome?;
        // A scrape whose captures could not all be stored is not done; leave
        // the job uncompleted so it stays claimable.
        match save_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Drain captured exchanges into storage under the scrape dataset.
///
/// Every exchange is attempted; the count of stored exchanges and the first
/// save error (if any) are returned once the stream closes.
async fn save_exchanges(
    coordinator: Arc<dyn Coordinator>,
    mut exchanges: mpsc::UnboundedReceiver<CapturedExchange>,
) -> (u32, Option<farescout_coordinator::CoordinatorError>) {
    let mut saved = 0u32;
    let mut first_err = None;
    while let Some(exchange) = exchanges.recv().await {
        let envelope = ResultEnvelope::new(DATASET, exchange.into_result());
        match coordinator.save_result(&envelope).await {
            Ok(()) => saved += 1,
            Err(e) => {
                warn!(error = %e, "failed to save captured exchange");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }
    (saved, first_err)
}

/// Shift a "YYYY-MM-DD" date forward by `offset` days.
pub(crate) fn shift_date(start_date: &str, offset: u32) -> Result<String, WorkerError> {
    let date = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
        .map_err(|_| WorkerError::InvalidDate(start_date.to_string()))?;
    let shifted = date + chrono::Days::new(u64::from(offset));
    Ok(shifted.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use farescout_coordinator::CoordinatorError;

    use super::*;

    #[test]
    fn shift_date_walks_forward() {
        assert_eq!(shift_date("2025-09-25", 0).unwrap(), "2025-09-25");
        assert_eq!(shift_date("2025-09-25", 3).unwrap(), "2025-09-28");
        // Month and year rollovers.
        assert_eq!(shift_date("2025-12-31", 1).unwrap(), "2026-01-01");
    }

    #[test]
    fn shift_date_rejects_garbage() {
        let err = shift_date("not-a-date", 1).unwrap_err();
        assert!(matches!(err, WorkerError::InvalidDate(_)));
    }

    #[test]
    fn booking_url_has_select_flight_shape() {
        let scrape = BrowserScrape {
            coordinator: std::sync::Arc::new(NullCoordinator),
            config: ScrapeConfig::default(),
        };
        assert_eq!(
            scrape.booking_url("WAW", "ALC", "2025-09-25"),
            "https://www.wizzair.com/en-gb/booking/select-flight/WAW/ALC/2025-09-25/null/1/0/0/null"
        );
    }

    fn exchange(path: &str) -> CapturedExchange {
        CapturedExchange {
            url: format!("https://be.wizzair.com/27.16.0/{path}"),
            body: serde_json::json!({ "outboundFlights": [] }),
            payload: None,
            fetch_date: "2025-07-10T12:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn draining_exchanges_counts_saves() {
        let coordinator = Arc::new(FlakyStorage::rejecting_first(0));
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(exchange("Api/search/search")).unwrap();
        tx.send(exchange("Api/search/flightDates")).unwrap();
        drop(tx);

        let (saved, err) = save_exchanges(coordinator.clone(), rx).await;
        assert_eq!(saved, 2);
        assert!(err.is_none());
        assert_eq!(coordinator.stored.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_capture_save_surfaces_after_the_stream_drains() {
        let coordinator = Arc::new(FlakyStorage::rejecting_first(1));
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(exchange("Api/search/search")).unwrap();
        tx.send(exchange("Api/search/flightDates")).unwrap();
        drop(tx);

        let (saved, err) = save_exchanges(coordinator.clone(), rx).await;
        // The later exchange is still attempted and stored.
        assert_eq!(saved, 1);
        assert_eq!(coordinator.stored.load(Ordering::SeqCst), 1);
        assert!(matches!(err, Some(CoordinatorError::Unavailable { status: 503, .. })));
    }

    /// Coordinator double whose first N `save_result` calls fail.
    struct FlakyStorage {
        rejections_left: AtomicU32,
        stored: AtomicU32,
    }

    impl FlakyStorage {
        fn rejecting_first(rejections: u32) -> Self {
            Self {
                rejections_left: AtomicU32::new(rejections),
                stored: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Coordinator for FlakyStorage {
        async fn fetch_job(&self) -> Result<Option<Job>, CoordinatorError> {
            Ok(None)
        }
        async fn complete_job(&self, _job_id: &str) -> Result<(), CoordinatorError> {
            Ok(())
        }
        async fn save_result(&self, envelope: &ResultEnvelope) -> Result<(), CoordinatorError> {
            assert_eq!(envelope.dataset_name, DATASET);
            if self
                .rejections_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(CoordinatorError::Unavailable {
                    status: 503,
                    url: "http://coordinator.test/storage/save_result".to_string(),
                });
            }
            self.stored.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn save_flight_dates(
            &self,
            _src_code: &str,
            _dst_code: &str,
            _dates: &serde_json::Value,
        ) -> Result<(), CoordinatorError> {
            Ok(())
        }
    }

    struct NullCoordinator;

    #[async_trait]
    impl Coordinator for NullCoordinator {
        async fn fetch_job(
            &self,
        ) -> Result<Option<Job>, farescout_coordinator::CoordinatorError> {
            Ok(None)
        }
        async fn complete_job(
            &self,
            _job_id: &str,
        ) -> Result<(), farescout_coordinator::CoordinatorError> {
            Ok(())
        }
        async fn save_result(
            &self,
            _envelope: &ResultEnvelope,
        ) -> Result<(), farescout_coordinator::CoordinatorError> {
            Ok(())
        }
        async fn save_flight_dates(
            &self,
            _src_code: &str,
            _dst_code: &str,
            _dates: &serde_json::Value,
        ) -> Result<(), farescout_coordinator::CoordinatorError> {
            Ok(())
        }
    }
}

//! Job dispatch by kind.

use async_trait::async_trait;

use farescout_core::{Job, kind};

use crate::error::WorkerError;
use crate::scrape_jobs::BrowserScrape;

/// Executes one job to completion. The worker loop owns the surrounding
/// fetch/complete/budget machinery; a handler only does the work itself.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn run(&self, job: &Job) -> Result<(), WorkerError>;
}

/// Routes jobs to the handler for their kind.
///
/// The API-backed kinds go to whichever airline handler the deployment
/// configured; browser scrapes always go through the debugger session.
/// Unknown kinds deserialize fine upstream; this is the point where they
/// become an error and count against the error budget.
pub struct Dispatcher {
    api: Box<dyn JobHandler>,
    browser: BrowserScrape,
}

impl Dispatcher {
    pub fn new(api: Box<dyn JobHandler>, browser: BrowserScrape) -> Self {
        Self { api, browser }
    }
}

#[async_trait]
impl JobHandler for Dispatcher {
    async fn run(&self, job: &Job) -> Result<(), WorkerError> {
        match job.kind.as_str() {
            kind::QUERY_DATES | kind::QUERY_FLIGHTS => self.api.run(job).await,
            kind::BROWSER_SCRAPE => self.browser.run(job).await,
            other => Err(WorkerError::UnknownJobType(other.to_string())),
        }
    }
}

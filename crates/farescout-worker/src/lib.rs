//! # farescout worker
//!
//! The orchestrating state machine: repeatedly fetch a job from the
//! coordinator, dispatch it by kind, report completion, pace with jittered
//! sleeps, and stop after a bounded run of failures.
//!
//! The loop is the sole catch point for errors: anything raised during fetch,
//! dispatch, or completion is logged and converted into exactly one decrement
//! of the error budget, then the loop continues. "No job available" is not an
//! error and never touches the budget.

mod budget;
mod config;
mod dispatch;
mod error;
mod ryanair_jobs;
mod scrape_jobs;
mod wizzair_jobs;
mod worker;

pub use budget::ErrorBudget;
pub use config::WorkerConfig;
pub use dispatch::{Dispatcher, JobHandler};
pub use error::WorkerError;
pub use ryanair_jobs::RyanairJobs;
pub use scrape_jobs::{BrowserScrape, ScrapeConfig};
pub use wizzair_jobs::WizzairJobs;
pub use worker::JobWorker;

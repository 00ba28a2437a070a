//! # farescout coordinator client
//!
//! HTTP client for the job-coordination service: fetching jobs, reporting
//! completion, and saving scrape results. The [`Coordinator`] trait is the
//! seam the worker loop depends on, so loop behavior can be tested against
//! scripted implementations.
//!
//! No call here retries; retry policy lives entirely in the worker's error
//! budget.

mod client;
mod error;

pub use client::{Coordinator, CoordinatorClient};
pub use error::CoordinatorError;

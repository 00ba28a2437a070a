//! # farescout core
//!
//! Shared data model for the farescout scraping worker:
//!
//! - [`Job`] — a unit of scraping work handed out by the coordinator
//! - [`ResultEnvelope`] — an immutable scrape result sent back once per job
//! - [`FlightQueryOptions`] — passenger counts and flex-day window for
//!   flight-detail queries
//! - [`pacing`] — jittered delays used to avoid fixed-interval request patterns

pub mod envelope;
pub mod job;
pub mod options;
pub mod pacing;

pub use envelope::ResultEnvelope;
pub use job::{Job, kind};
pub use options::FlightQueryOptions;

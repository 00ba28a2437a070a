//! # farescout sources
//!
//! Per-airline REST clients. Each client issues direct HTTP calls against the
//! airline's public API and wraps successful responses with route context and
//! a `fetch_date` captured at response-receipt time.
//!
//! Anti-bot challenge headers (wizzair) are opaque, time-sensitive values
//! supplied through configuration; this crate never generates them.

mod error;
pub mod ryanair;
pub mod wizzair;

pub use error::SourceError;
pub use ryanair::RyanairClient;
pub use wizzair::{WizzairChallenge, WizzairClient};

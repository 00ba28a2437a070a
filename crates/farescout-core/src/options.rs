//! Flight-detail query options.

use serde::{Deserialize, Serialize};

/// Passenger counts and flex-day window for a flight-detail query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlightQueryOptions {
    /// Adult passenger count.
    #[serde(default = "default_adult")]
    pub adult: u32,
    /// Teen passenger count.
    #[serde(default)]
    pub teen: u32,
    /// Child passenger count.
    #[serde(default)]
    pub child: u32,
    /// Infant passenger count.
    #[serde(default)]
    pub infant: u32,
    /// Days before the outbound date to widen the flexible search window.
    #[serde(default = "default_flex_days")]
    pub days_before: u32,
    /// Days after the outbound date to widen the flexible search window.
    #[serde(default = "default_flex_days")]
    pub days_after: u32,
}

fn default_adult() -> u32 {
    1
}

fn default_flex_days() -> u32 {
    2
}

impl Default for FlightQueryOptions {
    fn default() -> Self {
        Self {
            adult: default_adult(),
            teen: 0,
            child: 0,
            infant: 0,
            days_before: default_flex_days(),
            days_after: default_flex_days(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_api_contract() {
        let opts = FlightQueryOptions::default();
        assert_eq!(opts.adult, 1);
        assert_eq!(opts.teen, 0);
        assert_eq!(opts.child, 0);
        assert_eq!(opts.infant, 0);
        assert_eq!(opts.days_before, 2);
        assert_eq!(opts.days_after, 2);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let opts: FlightQueryOptions = serde_json::from_value(serde_json::json!({
            "adult": 2,
            "days_after": 0,
        }))
        .unwrap();
        assert_eq!(opts.adult, 2);
        assert_eq!(opts.days_before, 2);
        assert_eq!(opts.days_after, 0);
    }
}

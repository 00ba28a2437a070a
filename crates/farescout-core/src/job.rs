//! Scrape jobs as handed out by the coordinator.

use serde::{Deserialize, Serialize};

/// Well-known job kinds.
///
/// The kind travels on the wire as a plain string (field `type_`), so documents
/// with kinds this worker does not understand still deserialize; dispatch is
/// where an unknown kind becomes an error.
pub mod kind {
    /// Query available one-way fare dates for a route.
    pub const QUERY_DATES: &str = "QueryDatesJob";
    /// Query flight/price details for a route and date.
    pub const QUERY_FLIGHTS: &str = "QueryFlightsJob";
    /// Drive a live booking page through a debugger session and capture its
    /// API traffic.
    pub const BROWSER_SCRAPE: &str = "BrowserScrapeJob";
}

/// A unit of scraping work.
///
/// Owned by the worker for the duration of one execution. A job is either
/// fully processed (result saved and completion reported) or not reported at
/// all; there is no partial-completion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque job id assigned by the coordinator (a UUID upstream).
    pub id: String,
    /// Job kind, one of the [`kind`] constants for known jobs.
    #[serde(rename = "type_", alias = "type")]
    pub kind: String,
    /// Departure airport code (e.g. "WAW").
    pub src_code: String,
    /// Arrival airport code (e.g. "MAN").
    pub dst_code: String,
    /// Outbound date for flight-detail queries ("YYYY-MM-DD").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// First date of a browser-scrape date window ("YYYY-MM-DD").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Number of dates in a browser-scrape window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    /// Flex-day widening before the outbound date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_before: Option<u32>,
    /// Flex-day widening after the outbound date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_after: Option<u32>,
}

impl Job {
    /// Whether this worker knows how to execute the job.
    pub fn is_known_kind(&self) -> bool {
        matches!(
            self.kind.as_str(),
            kind::QUERY_DATES | kind::QUERY_FLIGHTS | kind::BROWSER_SCRAPE
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_query_dates_job() {
        let json = serde_json::json!({
            "id": "6a1b2c3d",
            "type_": "QueryDatesJob",
            "src_code": "WAW",
            "dst_code": "MAN",
        });
        let job: Job = serde_json::from_value(json).unwrap();
        assert_eq!(job.kind, kind::QUERY_DATES);
        assert_eq!(job.src_code, "WAW");
        assert_eq!(job.dst_code, "MAN");
        assert!(job.date.is_none());
        assert!(job.is_known_kind());
    }

    #[test]
    fn deserializes_query_flights_job_with_flex_days() {
        let json = serde_json::json!({
            "id": "j-1",
            "type_": "QueryFlightsJob",
            "src_code": "WAW",
            "dst_code": "ALC",
            "date": "2025-07-10",
            "days_before": 1,
            "days_after": 3,
        });
        let job: Job = serde_json::from_value(json).unwrap();
        assert_eq!(job.kind, kind::QUERY_FLIGHTS);
        assert_eq!(job.date.as_deref(), Some("2025-07-10"));
        assert_eq!(job.days_before, Some(1));
        assert_eq!(job.days_after, Some(3));
    }

    #[test]
    fn accepts_type_field_alias() {
        let json = serde_json::json!({
            "id": "j-2",
            "type": "BrowserScrapeJob",
            "src_code": "WAW",
            "dst_code": "ALC",
            "start_date": "2025-09-25",
            "days": 4,
        });
        let job: Job = serde_json::from_value(json).unwrap();
        assert_eq!(job.kind, kind::BROWSER_SCRAPE);
        assert_eq!(job.days, Some(4));
    }

    #[test]
    fn unknown_kind_deserializes_but_is_flagged() {
        let json = serde_json::json!({
            "id": "j-3",
            "type_": "BogusJob",
            "src_code": "WAW",
            "dst_code": "MAN",
        });
        let job: Job = serde_json::from_value(json).unwrap();
        assert_eq!(job.kind, "BogusJob");
        assert!(!job.is_known_kind());
    }

    #[test]
    fn serializes_kind_under_wire_name() {
        let job = Job {
            id: "j-4".to_string(),
            kind: kind::QUERY_DATES.to_string(),
            src_code: "WAW".to_string(),
            dst_code: "MAN".to_string(),
            date: None,
            start_date: None,
            days: None,
            days_before: None,
            days_after: None,
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["type_"], "QueryDatesJob");
        assert!(value.get("date").is_none());
    }
}

//! Wizzair public-API client.
//!
//! The search endpoint sits behind a bot-detection product; the challenge
//! response headers it expects are opaque, time-sensitive values that must be
//! supplied through configuration. When they expire the endpoint answers
//! non-200 and the jobs touching it fall back to browser scraping.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use farescout_core::FlightQueryOptions;

use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://be.wizzair.com";
const DEFAULT_API_VERSION: &str = "27.16.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque anti-bot challenge material, supplied externally.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WizzairChallenge {
    /// `x-kpsdk-cd` header value.
    pub kpsdk_cd: String,
    /// `x-kpsdk-ct` header value.
    pub kpsdk_ct: String,
    /// `x-kpsdk-v` header value.
    pub kpsdk_v: String,
    /// `x-requestverificationtoken` header value.
    pub request_verification_token: String,
}

/// Available flight dates for a route within a window.
#[derive(Debug, Clone, Serialize)]
pub struct FlightDates {
    pub dates: Value,
    pub src_code: String,
    pub dst_code: String,
    pub fetch_date: String,
}

/// Flight search result for a route and departure date.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSearch {
    pub flights: Value,
    pub src_code: String,
    pub dst_code: String,
    pub depart_date: String,
    pub fetch_date: String,
}

/// Client for Wizzair's versioned search API.
#[derive(Debug, Clone)]
pub struct WizzairClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    challenge: WizzairChallenge,
}

impl WizzairClient {
    pub fn new(challenge: WizzairChallenge) -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL, challenge)
    }

    /// Point the client at a different host. Used by tests.
    pub fn with_base_url(
        base_url: impl Into<String>,
        challenge: WizzairChallenge,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            challenge,
        })
    }

    /// Override the API version segment of the URL path.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Query available flight dates for a route between `from` and `to`
    /// (inclusive, "YYYY-MM-DD").
    pub async fn query_available_dates(
        &self,
        src_code: &str,
        dst_code: &str,
        from: &str,
        to: &str,
    ) -> Result<FlightDates, SourceError> {
        let url = format!(
            "{}/{}/Api/search/flightDates",
            self.base_url, self.api_version
        );
        let response = self
            .http
            .get(&url)
            .query(&[
                ("departureStation", src_code),
                ("arrivalStation", dst_code),
                ("from", from),
                ("to", to),
            ])
            .send()
            .await?;
        let status = response.status();
        if status.as_u16() != 200 {
            return Err(SourceError::Upstream {
                status: status.as_u16(),
                url,
            });
        }
        let dates: Value = serde_json::from_slice(&response.bytes().await?)?;
        debug!(src_code, dst_code, from, to, "queried wizzair flight dates");
        Ok(FlightDates {
            dates,
            src_code: src_code.to_string(),
            dst_code: dst_code.to_string(),
            fetch_date: Utc::now().to_rfc3339(),
        })
    }

    /// Search flight details for a route and departure date.
    pub async fn search_flight_details(
        &self,
        src_code: &str,
        dst_code: &str,
        depart_date: &str,
        opts: FlightQueryOptions,
    ) -> Result<FlightSearch, SourceError> {
        let url = format!("{}/{}/Api/search/search", self.base_url, self.api_version);
        let payload = json!({
            "isFlightChange": false,
            "flightList": [{
                "departureStation": src_code,
                "arrivalStation": dst_code,
                "departureDate": format!("{depart_date}T00:00:00"),
            }],
            "adultCount": opts.adult,
            "childCount": opts.child,
            "infantCount": opts.infant,
            "wdc": true,
        });
        let response = self
            .http
            .post(&url)
            .header("x-kpsdk-cd", &self.challenge.kpsdk_cd)
            .header("x-kpsdk-ct", &self.challenge.kpsdk_ct)
            .header("x-kpsdk-v", &self.challenge.kpsdk_v)
            .header(
                "x-requestverificationtoken",
                &self.challenge.request_verification_token,
            )
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if status.as_u16() != 200 {
            return Err(SourceError::Upstream {
                status: status.as_u16(),
                url,
            });
        }
        let flights: Value = serde_json::from_slice(&response.bytes().await?)?;
        debug!(src_code, dst_code, depart_date, "searched wizzair flights");
        Ok(FlightSearch {
            flights,
            src_code: src_code.to_string(),
            dst_code: dst_code.to_string(),
            depart_date: depart_date.to_string(),
            fetch_date: Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
#[path = "wizzair_tests.rs"]
mod tests;

//! Ryanair public-API client.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use farescout_core::FlightQueryOptions;

use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://www.ryanair.com";
const DEFAULT_CLIENT_VERSION: &str = "3.153.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Active airports listing, as returned by the locate API.
#[derive(Debug, Clone, Serialize)]
pub struct AirportList {
    pub airports: Value,
    pub fetch_date: String,
}

/// Destinations reachable from one airport.
#[derive(Debug, Clone, Serialize)]
pub struct Destinations {
    pub airports: Value,
    pub src_code: String,
    pub fetch_date: String,
}

/// Available one-way fare dates for a route.
#[derive(Debug, Clone, Serialize)]
pub struct AvailableDates {
    pub dates: Value,
    pub src_code: String,
    pub dst_code: String,
    pub fetch_date: String,
}

/// Flight/price detail for a route and date window.
#[derive(Debug, Clone, Serialize)]
pub struct FlightDetails {
    pub booking: Value,
    pub src_code: String,
    pub dst_code: String,
    pub date: String,
    pub fetch_date: String,
}

/// Client for Ryanair's public locate/fare-finder/booking APIs.
///
/// Every call carries the `Client`/`Client-Version` headers the web frontend
/// sends; without them the API rejects the request.
#[derive(Debug, Clone)]
pub struct RyanairClient {
    http: reqwest::Client,
    base_url: String,
    client_version: String,
}

impl RyanairClient {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different host. Used by tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
        })
    }

    /// Override the advertised frontend version.
    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = version.into();
        self
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value, SourceError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .header("Client", "desktop")
            .header("Client-Version", &self.client_version)
            .send()
            .await?;
        let status = response.status();
        if status.as_u16() != 200 {
            return Err(SourceError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    /// List all active airports.
    pub async fn list_airports(&self) -> Result<AirportList, SourceError> {
        let url = format!("{}/api/views/locate/5/airports/en/active", self.base_url);
        let airports = self.get(&url, &[]).await?;
        Ok(AirportList {
            airports,
            fetch_date: Utc::now().to_rfc3339(),
        })
    }

    /// List destinations reachable from `src_code`.
    pub async fn find_destinations(&self, src_code: &str) -> Result<Destinations, SourceError> {
        let url = format!(
            "{}/api/views/locate/searchWidget/routes/en/airport/{}",
            self.base_url, src_code
        );
        let airports = self.get(&url, &[]).await?;
        Ok(Destinations {
            airports,
            src_code: src_code.to_string(),
            fetch_date: Utc::now().to_rfc3339(),
        })
    }

    /// Query the dates with available one-way fares for a route.
    pub async fn query_available_dates(
        &self,
        src_code: &str,
        dst_code: &str,
    ) -> Result<AvailableDates, SourceError> {
        let url = format!(
            "{}/api/farfnd/3/oneWayFares/{}/{}/availabilities",
            self.base_url, src_code, dst_code
        );
        let dates = self.get(&url, &[]).await?;
        debug!(src_code, dst_code, "queried available dates");
        Ok(AvailableDates {
            dates,
            src_code: src_code.to_string(),
            dst_code: dst_code.to_string(),
            fetch_date: Utc::now().to_rfc3339(),
        })
    }

    /// Query flight/price details for a route and outbound date, widened by
    /// the flex-day window in `opts`.
    pub async fn query_flight_details(
        &self,
        src_code: &str,
        dst_code: &str,
        date: &str,
        opts: FlightQueryOptions,
    ) -> Result<FlightDetails, SourceError> {
        let url = format!("{}/api/booking/v4/en-gb/availability", self.base_url);
        let query = [
            ("ADT", opts.adult.to_string()),
            ("TEEN", opts.teen.to_string()),
            ("CHD", opts.child.to_string()),
            ("INF", opts.infant.to_string()),
            ("Origin", src_code.to_string()),
            ("Destination", dst_code.to_string()),
            ("promoCode", String::new()),
            ("IncludeConnectingFlights", "false".to_string()),
            ("DateOut", date.to_string()),
            ("DateIn", String::new()),
            ("FlexDaysBeforeOut", opts.days_before.to_string()),
            ("FlexDaysOut", opts.days_after.to_string()),
            ("FlexDaysBeforeIn", opts.days_before.to_string()),
            ("FlexDaysIn", opts.days_after.to_string()),
            ("RoundTrip", "false".to_string()),
            ("IncludePrimeFares", "false".to_string()),
            ("ToUs", "AGREED".to_string()),
        ];
        let booking = self.get(&url, &query).await?;
        debug!(src_code, dst_code, date, "queried flight details");
        Ok(FlightDetails {
            booking,
            src_code: src_code.to_string(),
            dst_code: dst_code.to_string(),
            date: date.to_string(),
            fetch_date: Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
#[path = "ryanair_tests.rs"]
mod tests;

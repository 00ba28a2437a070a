use super::*;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn available_dates_hits_fare_finder_with_frontend_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/farfnd/3/oneWayFares/WAW/MAN/availabilities"))
        .and(header("Client", "desktop"))
        .and(header("Client-Version", "3.153.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!(["2025-07-10", "2025-07-11"])),
        )
        .mount(&server)
        .await;

    let client = RyanairClient::with_base_url(server.uri()).unwrap();
    let result = client.query_available_dates("WAW", "MAN").await.unwrap();
    assert_eq!(result.src_code, "WAW");
    assert_eq!(result.dst_code, "MAN");
    assert_eq!(result.dates, serde_json::json!(["2025-07-10", "2025-07-11"]));
    assert!(chrono::DateTime::parse_from_rfc3339(&result.fetch_date).is_ok());
}

#[tokio::test]
async fn flight_details_sends_passenger_and_flex_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/booking/v4/en-gb/availability"))
        .and(query_param("ADT", "1"))
        .and(query_param("TEEN", "0"))
        .and(query_param("CHD", "0"))
        .and(query_param("INF", "0"))
        .and(query_param("Origin", "WAW"))
        .and(query_param("Destination", "MAN"))
        .and(query_param("DateOut", "2025-07-10"))
        .and(query_param("FlexDaysBeforeOut", "2"))
        .and(query_param("FlexDaysOut", "2"))
        .and(query_param("RoundTrip", "false"))
        .and(query_param("ToUs", "AGREED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "trips": [],
            "currency": "PLN",
        })))
        .mount(&server)
        .await;

    let client = RyanairClient::with_base_url(server.uri()).unwrap();
    let details = client
        .query_flight_details("WAW", "MAN", "2025-07-10", FlightQueryOptions::default())
        .await
        .unwrap();
    assert_eq!(details.date, "2025-07-10");
    assert_eq!(details.booking["currency"], "PLN");
}

#[tokio::test]
async fn flight_details_honors_custom_options() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/booking/v4/en-gb/availability"))
        .and(query_param("ADT", "2"))
        .and(query_param("CHD", "1"))
        .and(query_param("FlexDaysBeforeOut", "0"))
        .and(query_param("FlexDaysOut", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let opts = FlightQueryOptions {
        adult: 2,
        child: 1,
        days_before: 0,
        days_after: 4,
        ..FlightQueryOptions::default()
    };
    let client = RyanairClient::with_base_url(server.uri()).unwrap();
    client
        .query_flight_details("WAW", "ALC", "2025-08-01", opts)
        .await
        .unwrap();
}

#[tokio::test]
async fn destinations_carry_source_airport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/views/locate/searchWidget/routes/en/airport/WAW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"arrivalAirport": {"code": "MAN"}},
        ])))
        .mount(&server)
        .await;

    let client = RyanairClient::with_base_url(server.uri()).unwrap();
    let destinations = client.find_destinations("WAW").await.unwrap();
    assert_eq!(destinations.src_code, "WAW");
    assert!(destinations.airports.is_array());
}

#[tokio::test]
async fn non_200_is_an_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/views/locate/5/airports/en/active"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = RyanairClient::with_base_url(server.uri()).unwrap();
    let err = client.list_airports().await.unwrap_err();
    match err {
        SourceError::Upstream { status, url } => {
            assert_eq!(status, 429);
            assert!(url.contains("/airports/en/active"));
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

use super::*;

fn capture() -> NetworkCapture {
    NetworkCapture::new(CaptureConfig::new(vec![
        "Api/search/flightDates".to_string(),
        "Api/search/search".to_string(),
        "Api/asset/map".to_string(),
    ]))
}

fn post_event(request_id: &str, url: &str, payload: &str) -> NetworkEvent {
    NetworkEvent::RequestWillBeSent {
        request_id: request_id.to_string(),
        url: url.to_string(),
        method: "POST".to_string(),
        post_data: Some(payload.to_string()),
    }
}

fn response_event(request_id: &str, url: &str) -> NetworkEvent {
    NetworkEvent::ResponseReceived {
        request_id: request_id.to_string(),
        url: url.to_string(),
    }
}

#[test]
fn post_then_response_correlates_and_consumes_once() {
    let mut capture = capture();
    let url = "https://be.wizzair.com/27.16.0/Api/search/search";

    assert!(capture.observe(&post_event("R1", url, "{\"adultCount\":1}")).is_none());
    assert_eq!(capture.pending_len(), 1);

    let fetch = capture.observe(&response_event("R1", url)).unwrap();
    assert_eq!(fetch.request_id, "R1");
    assert_eq!(fetch.url, url);

    assert_eq!(capture.take_payload("R1").as_deref(), Some("{\"adultCount\":1}"));
    // Consumed once: the pending map no longer holds the request id.
    assert_eq!(capture.pending_len(), 0);
    assert!(capture.take_payload("R1").is_none());
}

#[test]
fn response_without_prior_request_has_no_payload() {
    let mut capture = capture();
    let url = "https://be.wizzair.com/Api/asset/map";

    let fetch = capture.observe(&response_event("R9", url)).unwrap();
    assert_eq!(fetch.request_id, "R9");
    assert!(capture.take_payload("R9").is_none());
}

#[test]
fn traffic_off_the_allowlist_is_ignored() {
    let mut capture = capture();
    let url = "https://www.wizzair.com/static/analytics.js";

    assert!(capture.observe(&post_event("R2", url, "{}")).is_none());
    assert_eq!(capture.pending_len(), 0);
    assert!(capture.observe(&response_event("R2", url)).is_none());
}

#[test]
fn get_requests_leave_no_pending_payload() {
    let mut capture = capture();
    let url = "https://be.wizzair.com/27.16.0/Api/search/flightDates?from=2025-06-01";
    let event = NetworkEvent::RequestWillBeSent {
        request_id: "R3".to_string(),
        url: url.to_string(),
        method: "GET".to_string(),
        post_data: None,
    };
    assert!(capture.observe(&event).is_none());
    assert_eq!(capture.pending_len(), 0);
}

#[test]
fn pending_map_is_bounded_with_oldest_evicted() {
    let mut capture = NetworkCapture::new(CaptureConfig {
        url_allowlist: vec!["Api/search".to_string()],
        max_pending_posts: 3,
    });
    let url = "https://be.wizzair.com/Api/search/search";
    for i in 0..5 {
        capture.observe(&post_event(&format!("R{i}"), url, "{}"));
    }
    assert_eq!(capture.pending_len(), 3);
    // R0 and R1 were evicted; the newest three survive.
    assert!(capture.take_payload("R0").is_none());
    assert!(capture.take_payload("R1").is_none());
    assert!(capture.take_payload("R4").is_some());
}

#[test]
fn duplicate_request_event_keeps_one_entry() {
    let mut capture = capture();
    let url = "https://be.wizzair.com/Api/search/search";
    capture.observe(&post_event("R1", url, "{\"a\":1}"));
    capture.observe(&post_event("R1", url, "{\"a\":2}"));
    assert_eq!(capture.pending_len(), 1);
    // Latest payload wins.
    assert_eq!(capture.take_payload("R1").as_deref(), Some("{\"a\":2}"));
}

#[test]
fn exchange_flattens_into_storage_document() {
    let exchange = CapturedExchange {
        url: "https://be.wizzair.com/Api/search/search".to_string(),
        body: serde_json::json!({"outboundFlights": []}),
        payload: Some(serde_json::json!({"adultCount": 1})),
        fetch_date: "2025-07-10T12:00:00+00:00".to_string(),
    };
    let doc = exchange.into_result();
    assert_eq!(doc["url"], "https://be.wizzair.com/Api/search/search");
    assert_eq!(doc["payload"]["adultCount"], 1);
    assert_eq!(doc["fetch_date"], "2025-07-10T12:00:00+00:00");
    assert!(doc["outboundFlights"].is_array());
}

#[test]
fn non_object_body_is_wrapped() {
    let exchange = CapturedExchange {
        url: "https://be.wizzair.com/Api/search/flightDates".to_string(),
        body: serde_json::json!(["2025-07-10", "2025-07-11"]),
        payload: None,
        fetch_date: "2025-07-10T12:00:00+00:00".to_string(),
    };
    let doc = exchange.into_result();
    assert!(doc["body"].is_array());
    assert_eq!(doc["url"], "https://be.wizzair.com/Api/search/flightDates");
    assert!(doc.get("payload").is_none());
}

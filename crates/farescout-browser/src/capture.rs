//! Network-traffic capture for an attached tab.
//!
//! Correlates `requestWillBeSent` / `responseReceived` pairs by request id,
//! keeps POST payloads until their response arrives (consume-once), and
//! extracts response bodies for URLs on an allow-list. A malformed body is
//! logged and dropped; the capture never aborts the session over one bad
//! response.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::protocol::NetworkEvent;
use crate::tab::TabSession;

/// Bound on buffered POST payloads. Requests that never see a response would
/// otherwise accumulate here for the life of the session.
const DEFAULT_MAX_PENDING: usize = 64;

/// Capture settings.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// URL substrings worth capturing; all other traffic is ignored.
    pub url_allowlist: Vec<String>,
    /// Cap on the pending-POST map; oldest entries are evicted past this.
    pub max_pending_posts: usize,
}

impl CaptureConfig {
    pub fn new(url_allowlist: Vec<String>) -> Self {
        Self {
            url_allowlist,
            max_pending_posts: DEFAULT_MAX_PENDING,
        }
    }
}

/// One captured request/response exchange.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedExchange {
    /// Originating request URL.
    pub url: String,
    /// Decoded response body.
    pub body: Value,
    /// The request's POST payload, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// RFC 3339 timestamp of body extraction.
    pub fetch_date: String,
}

impl CapturedExchange {
    /// Flatten into the storage document shape: the response body with the
    /// URL, payload, and fetch date folded in.
    pub fn into_result(self) -> Value {
        let mut doc = match self.body {
            Value::Object(map) => Value::Object(map),
            other => serde_json::json!({ "body": other }),
        };
        if let Value::Object(map) = &mut doc {
            map.insert("url".to_string(), Value::String(self.url));
            if let Some(payload) = self.payload {
                map.insert("payload".to_string(), payload);
            }
            map.insert("fetch_date".to_string(), Value::String(self.fetch_date));
        }
        doc
    }
}

/// A response whose body should be fetched from the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyFetch {
    pub request_id: String,
    pub url: String,
}

/// Per-session correlation state. Owned by the capture task for one tab;
/// nothing here is shared or global.
pub struct NetworkCapture {
    config: CaptureConfig,
    pending_posts: HashMap<String, String>,
    pending_order: VecDeque<String>,
}

impl NetworkCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            pending_posts: HashMap::new(),
            pending_order: VecDeque::new(),
        }
    }

    /// Whether a URL is on the allow-list.
    pub fn matches(&self, url: &str) -> bool {
        self.config
            .url_allowlist
            .iter()
            .any(|needle| url.contains(needle.as_str()))
    }

    /// Feed one network event through the correlation state.
    ///
    /// Returns a [`BodyFetch`] when a response on an allow-listed URL arrived
    /// and its body should be pulled from the browser.
    pub fn observe(&mut self, event: &NetworkEvent) -> Option<BodyFetch> {
        if !self.matches(event.url()) {
            return None;
        }
        match event {
            NetworkEvent::RequestWillBeSent {
                request_id,
                url,
                method,
                post_data: Some(post_data),
            } if method == "POST" => {
                debug!(request_id, url, "captured POST payload");
                self.insert_pending(request_id.clone(), post_data.clone());
                None
            }
            NetworkEvent::RequestWillBeSent { .. } => None,
            NetworkEvent::ResponseReceived { request_id, url } => Some(BodyFetch {
                request_id: request_id.clone(),
                url: url.clone(),
            }),
        }
    }

    /// Take the pending POST payload for a request, removing it. A request
    /// id yields its payload at most once.
    pub fn take_payload(&mut self, request_id: &str) -> Option<String> {
        let payload = self.pending_posts.remove(request_id);
        if payload.is_some() {
            self.pending_order.retain(|id| id != request_id);
        }
        payload
    }

    /// Number of POST payloads awaiting a response.
    pub fn pending_len(&self) -> usize {
        self.pending_posts.len()
    }

    fn insert_pending(&mut self, request_id: String, post_data: String) {
        if self.pending_posts.insert(request_id.clone(), post_data).is_none() {
            self.pending_order.push_back(request_id);
        }
        while self.pending_posts.len() > self.config.max_pending_posts {
            if let Some(oldest) = self.pending_order.pop_front() {
                self.pending_posts.remove(&oldest);
                warn!(request_id = %oldest, "evicted unmatched POST payload");
            }
        }
    }
}

/// Drive capture for one session: consume its network-event stream, extract
/// allow-listed response bodies, and emit [`CapturedExchange`]s.
///
/// Runs until the event stream closes or the output channel is dropped.
pub async fn run_capture(
    session: TabSession,
    mut events: mpsc::UnboundedReceiver<NetworkEvent>,
    mut capture: NetworkCapture,
    out: mpsc::UnboundedSender<CapturedExchange>,
) {
    while let Some(event) = events.recv().await {
        let Some(fetch) = capture.observe(&event) else {
            continue;
        };
        let body_text = match session.get_response_body(&fetch.request_id).await {
            Ok(text) => text,
            Err(e) => {
                warn!(request_id = %fetch.request_id, url = %fetch.url, error = %e,
                    "failed to fetch response body, dropping");
                continue;
            }
        };
        let body: Value = match serde_json::from_str(&body_text) {
            Ok(body) => body,
            Err(e) => {
                warn!(request_id = %fetch.request_id, url = %fetch.url, error = %e,
                    "undecodable response body, dropping");
                continue;
            }
        };
        let payload = capture
            .take_payload(&fetch.request_id)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!(request_id = %fetch.request_id, error = %e,
                        "undecodable POST payload, omitting");
                    None
                }
            });
        let exchange = CapturedExchange {
            url: fetch.url,
            body,
            payload,
            fetch_date: Utc::now().to_rfc3339(),
        };
        if out.send(exchange).is_err() {
            break;
        }
    }
    debug!("capture stream ended");
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;

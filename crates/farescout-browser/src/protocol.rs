//! CDP wire types and the network-event view used for capture.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CDP command message.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Any inbound CDP message: a command response (`id` set) or an event
/// (`method` set, no `id`).
#[derive(Debug, Clone, Deserialize)]
pub struct CdpMessage {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorBody>,
    pub method: Option<String>,
    pub params: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

impl CdpMessage {
    pub fn is_event(&self) -> bool {
        self.id.is_none() && self.method.is_some()
    }
}

/// Error object inside a CDP response.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpErrorBody {
    pub code: i64,
    pub message: String,
}

/// Page info from the browser's `/json` HTTP endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

/// Browser version info from `/json/version`.
///
/// Chrome returns PascalCase names for most of this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

/// The two Network-domain lifecycle events capture cares about.
///
/// Correlation is keyed purely on `request_id`: events arrive on a background
/// stream with no ordering guarantee relative to the main control flow.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    RequestWillBeSent {
        request_id: String,
        url: String,
        method: String,
        post_data: Option<String>,
    },
    ResponseReceived {
        request_id: String,
        url: String,
    },
}

impl NetworkEvent {
    /// Parse a raw CDP event into a network lifecycle event, if it is one.
    pub fn from_cdp(method: &str, params: &Value) -> Option<Self> {
        match method {
            "Network.requestWillBeSent" => {
                let request_id = params.get("requestId")?.as_str()?.to_string();
                let request = params.get("request")?;
                Some(NetworkEvent::RequestWillBeSent {
                    request_id,
                    url: request.get("url")?.as_str()?.to_string(),
                    method: request
                        .get("method")
                        .and_then(Value::as_str)
                        .unwrap_or("GET")
                        .to_string(),
                    post_data: request
                        .get("postData")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            }
            "Network.responseReceived" => {
                let request_id = params.get("requestId")?.as_str()?.to_string();
                let response = params.get("response")?;
                Some(NetworkEvent::ResponseReceived {
                    request_id,
                    url: response.get("url")?.as_str()?.to_string(),
                })
            }
            _ => None,
        }
    }

    /// The request id this event belongs to.
    pub fn request_id(&self) -> &str {
        match self {
            NetworkEvent::RequestWillBeSent { request_id, .. }
            | NetworkEvent::ResponseReceived { request_id, .. } => request_id,
        }
    }

    /// The URL carried by this event.
    pub fn url(&self) -> &str {
        match self {
            NetworkEvent::RequestWillBeSent { url, .. }
            | NetworkEvent::ResponseReceived { url, .. } => url,
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

//! CDP WebSocket transport.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{RwLock, mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use crate::error::BrowserError;
use crate::protocol::{BrowserVersion, CdpMessage, CdpRequest, PageInfo};
use crate::tab::TabSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Default deadline for a single protocol command.
pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// A command awaiting its response.
pub(crate) struct PendingCommand {
    pub tx: oneshot::Sender<Result<Value, BrowserError>>,
}

pub(crate) type PendingMap = Arc<Mutex<HashMap<u64, PendingCommand>>>;
pub(crate) type EventRoutes = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<CdpMessage>>>>;

/// Client for a browser's remote-debugging endpoint.
///
/// Commands are sent with auto-incrementing ids and responses correlated back
/// to the caller; events are routed by session id to the tab session they
/// belong to. The transport is generic "attach / send command / subscribe to
/// events" plumbing — nothing in here knows about scraping.
pub struct CdpClient {
    /// HTTP endpoint used for tab creation and discovery.
    http_endpoint: String,
    http: reqwest::Client,
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    request_id: Arc<AtomicU64>,
    pending: PendingMap,
    event_routes: EventRoutes,
    _recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a browser debugging endpoint (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, BrowserError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()?;

        let version_url = format!("{http_endpoint}/json/version");
        debug!(url = %version_url, "discovering browser websocket endpoint");
        let version: BrowserVersion = http.get(&version_url).send().await?.json().await?;
        debug!(browser = %version.browser, "connected to browser");

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
        let (ws_sink, ws_source) = ws_stream.split();

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let event_routes: EventRoutes = Arc::new(RwLock::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            let event_routes = event_routes.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending, event_routes).await;
            })
        };

        Ok(Self {
            http_endpoint,
            http,
            ws_tx: Arc::new(tokio::sync::Mutex::new(ws_sink)),
            request_id: Arc::new(AtomicU64::new(1)),
            pending,
            event_routes,
            _recv_task: recv_task,
        })
    }

    /// WebSocket receive loop: correlate responses, route events.
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap, event_routes: EventRoutes) {
        while let Some(msg) = ws_source.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text.to_string(),
                Ok(Message::Close(_)) => {
                    debug!("websocket closed by browser");
                    break;
                }
                Ok(_) => continue,
                Err(e) => {
                    error!(error = %e, "websocket read error, stopping");
                    break;
                }
            };

            trace!(%text, "cdp recv");
            let msg: CdpMessage = match serde_json::from_str(&text) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(error = %e, "unparseable cdp message, dropping");
                    continue;
                }
            };

            if let Some(id) = msg.id {
                if let Some(cmd) = pending.lock().remove(&id) {
                    let result = match msg.error {
                        Some(err) => Err(BrowserError::Command {
                            code: err.code,
                            message: err.message,
                        }),
                        None => Ok(msg.result.unwrap_or(Value::Null)),
                    };
                    let _ = cmd.tx.send(result);
                }
            } else if msg.is_event() {
                let session_id = msg.session_id.clone().unwrap_or_default();
                let routes = event_routes.read().await;
                if let Some(tx) = routes.get(&session_id) {
                    let _ = tx.send(msg);
                }
            }
        }

        // Fail anything still in flight so callers see the disconnect
        // immediately instead of waiting out their timeout.
        pending.lock().clear();
    }

    /// Send a root-scoped command and wait for its response.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, BrowserError> {
        send_command(
            &self.ws_tx,
            &self.pending,
            &self.request_id,
            method,
            params,
            None,
        )
        .await
    }

    /// Open a new tab at `url` and attach a debug session to it.
    pub async fn open_tab(&self, url: &str) -> Result<TabSession, BrowserError> {
        // Chrome requires PUT for /json/new.
        let create_url = format!("{}/json/new?{}", self.http_endpoint, url);
        let page: PageInfo = self.http.put(&create_url).send().await?.json().await?;
        debug!(target_id = %page.id, url = %page.url, "opened tab");
        self.attach(&page.id).await
    }

    /// Attach a debug session to an existing tab.
    ///
    /// Fails with [`BrowserError::Attach`] if the tab is gone or another
    /// debugger is already attached.
    pub async fn attach(&self, target_id: &str) -> Result<TabSession, BrowserError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({ "targetId": target_id, "flatten": true })),
            )
            .await
            .map_err(|e| BrowserError::Attach(e.to_string()))?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| BrowserError::InvalidResponse("missing sessionId".to_string()))?
            .to_string();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.event_routes
            .write()
            .await
            .insert(session_id.clone(), event_tx);
        debug!(target_id, session_id = %session_id, "debugger attached");

        Ok(TabSession::new(
            target_id.to_string(),
            session_id,
            self.ws_tx.clone(),
            self.pending.clone(),
            self.request_id.clone(),
            self.event_routes.clone(),
            event_rx,
        ))
    }

    /// Close a tab.
    pub async fn close_tab(&self, target_id: &str) -> Result<(), BrowserError> {
        self.call("Target.closeTarget", Some(json!({ "targetId": target_id })))
            .await?;
        debug!(target_id, "tab closed");
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}

/// Shared command send path used by the client and by tab sessions.
pub(crate) async fn send_command(
    ws_tx: &Arc<tokio::sync::Mutex<WsSink>>,
    pending: &PendingMap,
    request_id: &Arc<AtomicU64>,
    method: &str,
    params: Option<Value>,
    session_id: Option<&str>,
) -> Result<Value, BrowserError> {
    let id = request_id.fetch_add(1, Ordering::SeqCst);
    let request = CdpRequest {
        id,
        method: method.to_string(),
        params,
        session_id: session_id.map(str::to_string),
    };
    let json = serde_json::to_string(&request)?;
    trace!(%json, "cdp send");

    // Register before sending to avoid racing the response.
    let (tx, rx) = oneshot::channel();
    pending.lock().insert(id, PendingCommand { tx });

    {
        let mut ws = ws_tx.lock().await;
        ws.send(Message::Text(json.into())).await?;
    }

    match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(BrowserError::SessionClosed),
        Err(_) => {
            pending.lock().remove(&id);
            Err(BrowserError::Timeout(format!("command {method}")))
        }
    }
}

//! One attached tab: command channel, domain enablement, load detection.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use base64::Engine;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cdp::{EventRoutes, PendingMap, WsSink, send_command};
use crate::error::BrowserError;
use crate::protocol::{CdpMessage, NetworkEvent};

/// How long to wait for a page to finish loading.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// A debug session attached to a single tab.
///
/// State machine: detached → attached → domains enabled → listening. The
/// session is cheap to clone; clones share the command channel and event
/// plumbing. [`TabSession::detach`] is the orderly teardown — it deregisters
/// the event route so nothing keeps listening after the session ends.
#[derive(Clone)]
pub struct TabSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    target_id: String,
    session_id: String,
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    pending: PendingMap,
    request_id: Arc<AtomicU64>,
    event_routes: EventRoutes,
    load_gate: LoadGate,
    network_rx: Mutex<Option<mpsc::UnboundedReceiver<NetworkEvent>>>,
    router: tokio::task::JoinHandle<()>,
}

impl TabSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
        pending: PendingMap,
        request_id: Arc<AtomicU64>,
        event_routes: EventRoutes,
        mut event_rx: mpsc::UnboundedReceiver<CdpMessage>,
    ) -> Self {
        let (load_tx, load_rx) = watch::channel(0u64);
        let (network_tx, network_rx) = mpsc::unbounded_channel();

        // Route the session's raw event stream: load events bump the watch
        // counter, network lifecycle events go to whoever took the receiver.
        // Everything else is dropped.
        let router = tokio::spawn(async move {
            while let Some(msg) = event_rx.recv().await {
                let Some(method) = msg.method.as_deref() else {
                    continue;
                };
                if method == "Page.loadEventFired" {
                    load_tx.send_modify(|n| *n += 1);
                    continue;
                }
                let params = msg.params.unwrap_or(Value::Null);
                if let Some(event) = NetworkEvent::from_cdp(method, &params) {
                    let _ = network_tx.send(event);
                }
            }
        });

        Self {
            inner: Arc::new(SessionInner {
                target_id,
                session_id,
                ws_tx,
                pending,
                request_id,
                event_routes,
                load_gate: LoadGate::new(load_rx),
                network_rx: Mutex::new(Some(network_rx)),
                router,
            }),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.inner.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Send a protocol command scoped to this session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, BrowserError> {
        send_command(
            &self.inner.ws_tx,
            &self.inner.pending,
            &self.inner.request_id,
            method,
            params,
            Some(&self.inner.session_id),
        )
        .await
    }

    /// Enable a protocol domain (e.g. "Network", "Page"). Idempotent: the
    /// browser treats repeated enables as no-ops.
    pub async fn enable_domain(&self, domain: &str) -> Result<(), BrowserError> {
        self.call(&format!("{domain}.enable"), Some(json!({}))).await?;
        debug!(session_id = %self.inner.session_id, domain, "domain enabled");
        Ok(())
    }

    /// Navigate the tab. Does not wait for the load to finish; pair with
    /// [`TabSession::wait_for_load`].
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let result = self.call("Page.navigate", Some(json!({ "url": url }))).await?;
        if let Some(error_text) = result.get("errorText").and_then(Value::as_str) {
            if !error_text.is_empty() {
                return Err(BrowserError::Navigation(error_text.to_string()));
            }
        }
        debug!(url, "navigation started");
        Ok(())
    }

    /// Wait for the next page load to complete.
    ///
    /// Resolves exactly once per load event, including a load that finished
    /// between `navigate` returning and this call starting. The internal
    /// watch registration is dropped when this future settles, so waiters
    /// never leak across navigations.
    pub async fn wait_for_load(&self, timeout: Duration) -> Result<(), BrowserError> {
        self.inner.load_gate.wait(timeout).await
    }

    /// Fetch a captured response body by request id.
    pub async fn get_response_body(&self, request_id: &str) -> Result<String, BrowserError> {
        let result = self
            .call(
                "Network.getResponseBody",
                Some(json!({ "requestId": request_id })),
            )
            .await?;
        let body = result
            .get("body")
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::InvalidResponse("missing response body".to_string()))?;
        if result
            .get("base64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(body)
                .map_err(|e| BrowserError::BodyDecode(e.to_string()))?;
            String::from_utf8(bytes).map_err(|e| BrowserError::BodyDecode(e.to_string()))
        } else {
            Ok(body.to_string())
        }
    }

    /// Take the session's network-event stream. Yields `None` after the first
    /// call: there is exactly one consumer per session.
    pub fn take_network_events(&self) -> Option<mpsc::UnboundedReceiver<NetworkEvent>> {
        self.inner.network_rx.lock().take()
    }

    /// Tear the session down: deregister the event route and detach the
    /// debugger. Detach failures are logged, not propagated — the tab may
    /// already be gone.
    pub async fn detach(&self) {
        self.inner
            .event_routes
            .write()
            .await
            .remove(&self.inner.session_id);
        if let Err(e) = send_command(
            &self.inner.ws_tx,
            &self.inner.pending,
            &self.inner.request_id,
            "Target.detachFromTarget",
            Some(json!({ "sessionId": self.inner.session_id })),
            None,
        )
        .await
        {
            warn!(error = %e, session_id = %self.inner.session_id, "detach failed");
        }
        debug!(session_id = %self.inner.session_id, "session detached");
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.router.abort();
    }
}

/// Load-completion gate over a watch counter.
///
/// The router bumps the counter on every `Page.loadEventFired`; each `wait`
/// consumes exactly one bump, in order, regardless of whether the bump
/// happened before or after the wait started.
struct LoadGate {
    rx: watch::Receiver<u64>,
    consumed: Mutex<u64>,
}

impl LoadGate {
    fn new(rx: watch::Receiver<u64>) -> Self {
        Self {
            rx,
            consumed: Mutex::new(0),
        }
    }

    async fn wait(&self, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        let mut rx = self.rx.clone();
        loop {
            let current = *rx.borrow_and_update();
            {
                let mut consumed = self.consumed.lock();
                if current > *consumed {
                    *consumed += 1;
                    return Ok(());
                }
            }
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or_else(|| BrowserError::Timeout("page load".to_string()))?;
            tokio::time::timeout(remaining, rx.changed())
                .await
                .map_err(|_| BrowserError::Timeout("page load".to_string()))?
                .map_err(|_| BrowserError::SessionClosed)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_resolves_on_load_event() {
        let (tx, rx) = watch::channel(0u64);
        let gate = LoadGate::new(rx);
        tx.send_modify(|n| *n += 1);
        gate.wait(Duration::from_millis(100)).await.unwrap();
    }

    #[tokio::test]
    async fn wait_times_out_without_load() {
        let (_tx, rx) = watch::channel(0u64);
        let gate = LoadGate::new(rx);
        let err = gate.wait(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, BrowserError::Timeout(_)));
    }

    #[tokio::test]
    async fn each_load_is_consumed_once() {
        let (tx, rx) = watch::channel(0u64);
        let gate = LoadGate::new(rx);
        tx.send_modify(|n| *n += 1);
        tx.send_modify(|n| *n += 1);
        // Two loads buffered: two waits resolve, a third times out.
        gate.wait(Duration::from_millis(50)).await.unwrap();
        gate.wait(Duration::from_millis(50)).await.unwrap();
        let err = gate.wait(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, BrowserError::Timeout(_)));
    }

    #[tokio::test]
    async fn wait_resolves_when_load_arrives_later() {
        let (tx, rx) = watch::channel(0u64);
        let gate = LoadGate::new(rx);
        let waiter = tokio::spawn(async move {
            gate.wait(Duration::from_secs(1)).await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send_modify(|n| *n += 1);
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn closed_channel_is_session_closed() {
        let (tx, rx) = watch::channel(0u64);
        let gate = LoadGate::new(rx);
        drop(tx);
        let err = gate.wait(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, BrowserError::SessionClosed));
    }
}

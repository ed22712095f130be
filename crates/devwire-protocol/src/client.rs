//! CDP client: owns the transport, correlates replies, fans out events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::bus::{EventBus, EventStream};
use crate::discovery::discover_browser;
use crate::error::CdpError;
use crate::pending::{PendingCall, PendingCalls, Resolution};
use crate::protocol::{self, Command, Frame};
use crate::session::{EventFilter, MethodFilter, SessionFilter, SessionHandle, SessionId};
use crate::transport::{Incoming, Transport, TransportParts, TransportSink, WebSocketTransport};

struct Inner {
    sink: Box<dyn TransportSink>,
    pending: Arc<PendingCalls>,
    bus: Arc<EventBus>,
    /// Asks the ingestion task to stop.
    shutdown: CancellationToken,
    /// Fires once the connection is gone, whatever the cause.
    terminated: CancellationToken,
    closing: AtomicBool,
    ingest_task: JoinHandle<()>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.ingest_task.abort();
        self.pending.fail_all();
        self.bus.close();
        self.terminated.cancel();
    }
}

/// CDP client for one connection.
///
/// Cheap to clone; all clones share the connection. Hand a clone to each
/// domain wrapper that needs to issue commands or watch events.
#[derive(Clone)]
pub struct CdpClient {
    inner: Arc<Inner>,
}

impl CdpClient {
    /// Start a client over an already connected transport.
    ///
    /// Spawns the ingestion task, so this must run inside a Tokio runtime.
    pub fn new(transport: impl Transport) -> Self {
        let TransportParts { sink, incoming } = transport.into_parts();
        let pending = Arc::new(PendingCalls::new());
        let bus = EventBus::new();
        let shutdown = CancellationToken::new();
        let terminated = CancellationToken::new();

        let ingest_task = tokio::spawn(Self::receive_loop(
            incoming,
            pending.clone(),
            bus.clone(),
            shutdown.clone(),
            terminated.clone(),
        ));

        Self {
            inner: Arc::new(Inner {
                sink,
                pending,
                bus,
                shutdown,
                terminated,
                closing: AtomicBool::new(false),
                ingest_task,
            }),
        }
    }

    /// Connect to a DevTools WebSocket URL (`ws://host:port/devtools/browser/...`).
    pub async fn connect(ws_url: &str) -> Result<Self, CdpError> {
        let transport = WebSocketTransport::connect(ws_url).await?;
        debug!("CDP client connected to {}", ws_url);
        Ok(Self::new(transport))
    }

    /// Discover the browser WebSocket through an HTTP endpoint
    /// (e.g. "http://localhost:9222") and connect to it.
    pub async fn connect_endpoint(endpoint: &str) -> Result<Self, CdpError> {
        let version = discover_browser(endpoint).await?;
        Self::connect(&version.web_socket_debugger_url).await
    }

    /// Ingestion loop. The only place responses are resolved and events
    /// published.
    async fn receive_loop(
        mut incoming: Incoming,
        pending: Arc<PendingCalls>,
        bus: Arc<EventBus>,
        shutdown: CancellationToken,
        terminated: CancellationToken,
    ) {
        loop {
            let frame = tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("CDP receive loop stopped");
                    break;
                }
                frame = incoming.next() => frame,
            };

            match frame {
                Some(Ok(text)) => Self::dispatch(&text, &pending, &bus),
                Some(Err(e)) => {
                    error!("CDP transport error: {}", e);
                    break;
                }
                None => {
                    debug!("CDP transport closed by peer");
                    break;
                }
            }
        }

        let failed = pending.fail_all();
        if failed > 0 {
            warn!(failed, "failed outstanding CDP calls on disconnect");
        }
        bus.close();
        terminated.cancel();
    }

    /// Route one incoming frame.
    fn dispatch(text: &str, pending: &PendingCalls, bus: &EventBus) {
        trace!("CDP recv: {}", text);
        match protocol::decode(text) {
            Ok(Frame::Response(response)) => {
                let id = response.id;
                match pending.resolve(response) {
                    Resolution::Delivered => {}
                    Resolution::Abandoned => debug!(id, "response for abandoned call dropped"),
                    Resolution::Stale => warn!(id, "stale or unexpected CDP response dropped"),
                }
            }
            Ok(Frame::Event(event)) => {
                bus.publish(event);
            }
            Err(e) => {
                warn!("Failed to parse CDP message: {}", e);
                if let Some(id) = e.id {
                    pending.fail(id, CdpError::Decode(e));
                }
            }
        }
    }

    /// Issue a command and return a handle to await its response.
    ///
    /// Fails with [`CdpError::ConnectionClosed`] after close (including a
    /// close that lands while the frame is being written), and with
    /// [`CdpError::Transport`] if the frame could not be written; a write
    /// failure also closes the connection.
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&SessionId>,
    ) -> Result<PendingCall, CdpError> {
        let call = self.inner.pending.register(method, session_id)?;
        let command = Command::new(call.id(), method, params, session_id.cloned());

        let json = match protocol::encode(&command) {
            Ok(json) => json,
            Err(e) => {
                self.inner.pending.cancel(call.id());
                return Err(e.into());
            }
        };
        trace!("CDP send: {}", json);

        if let Err(e) = self.inner.sink.send(json).await {
            self.inner.pending.cancel(call.id());
            // A close that raced this write already failed the call.
            if self.inner.closing.load(Ordering::SeqCst) || self.inner.pending.is_closed() {
                debug!(method, "CDP write failed after close: {}", e);
                return Err(CdpError::ConnectionClosed);
            }
            error!(method, "CDP write failed, closing connection: {}", e);
            self.close().await;
            return Err(match e {
                CdpError::Transport(_) => e,
                other => CdpError::Transport(other.to_string()),
            });
        }

        Ok(call)
    }

    /// Send a CDP command and wait for its response.
    pub async fn send(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&SessionId>,
    ) -> Result<Value, CdpError> {
        self.call(method, params, session_id).await?.await
    }

    /// [`send`](Self::send) with a deadline. On elapse the call is
    /// cancelled so a late reply is dropped as stale.
    pub async fn send_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&SessionId>,
        timeout: Duration,
    ) -> Result<Value, CdpError> {
        let call = self.call(method, params, session_id).await?;
        let id = call.id();
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                self.cancel(id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }

    /// Forget an outstanding call. A task still awaiting it gets
    /// [`CdpError::Cancelled`]. Returns `false` if it was not outstanding.
    pub fn cancel(&self, id: u64) -> bool {
        self.inner.pending.cancel(id)
    }

    /// Subscribe to events matching a method and session filter.
    pub fn events(
        &self,
        method: impl Into<MethodFilter>,
        session: impl Into<SessionFilter>,
    ) -> EventStream {
        self.inner.bus.subscribe(EventFilter::new(method, session))
    }

    /// View scoped to one target session.
    pub fn session(&self, session_id: impl Into<SessionId>) -> SessionHandle {
        SessionHandle::new(self.clone(), Some(session_id.into()))
    }

    /// View scoped to the browser-level target.
    pub fn root(&self) -> SessionHandle {
        SessionHandle::new(self.clone(), None)
    }

    /// Close the connection: fail outstanding calls, end event streams.
    ///
    /// Idempotent and safe to call from several tasks.
    pub async fn close(&self) {
        if !self.inner.closing.swap(true, Ordering::SeqCst) {
            debug!("Closing CDP client");
            self.inner.shutdown.cancel();
            if let Err(e) = self.inner.sink.close().await {
                debug!("Transport close failed: {}", e);
            }
        }
        self.inner.pending.fail_all();
        self.inner.bus.close();
        self.inner.terminated.cancel();
    }

    /// Resolves once the connection has ended, by [`close`](Self::close)
    /// or by transport loss.
    pub async fn closed(&self) {
        self.inner.terminated.cancelled().await
    }

    pub fn is_closed(&self) -> bool {
        self.inner.terminated.is_cancelled() || self.inner.pending.is_closed()
    }

    /// Number of calls awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Number of live event subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.bus.subscriber_count()
    }
}

impl std::fmt::Debug for CdpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpClient")
            .field("pending", &self.pending_count())
            .field("subscribers", &self.subscriber_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

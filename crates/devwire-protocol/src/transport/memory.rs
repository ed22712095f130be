//! In-process transport pair, used for tests and for embedding a peer in
//! the same process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;

use super::{Transport, TransportParts, TransportSink};
use crate::error::CdpError;

/// Client side of an in-memory connection.
pub struct MemoryTransport {
    outgoing: mpsc::UnboundedSender<String>,
    incoming: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

/// Peer side of an in-memory connection.
///
/// Sees every frame the client writes and injects frames for the client
/// to read. Dropping the peer makes further client writes fail.
pub struct MemoryPeer {
    outgoing: mpsc::UnboundedReceiver<String>,
    incoming: Option<mpsc::UnboundedSender<String>>,
    closed: Arc<AtomicBool>,
}

impl MemoryTransport {
    pub fn pair() -> (MemoryTransport, MemoryPeer) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));
        (
            MemoryTransport {
                outgoing: out_tx,
                incoming: in_rx,
                closed: closed.clone(),
            },
            MemoryPeer {
                outgoing: out_rx,
                incoming: Some(in_tx),
                closed,
            },
        )
    }
}

impl Transport for MemoryTransport {
    fn into_parts(self) -> TransportParts {
        let incoming = futures::stream::unfold(self.incoming, |mut rx| async move {
            rx.recv().await.map(|frame| (Ok(frame), rx))
        })
        .boxed();

        TransportParts {
            sink: Box::new(MemorySink {
                tx: self.outgoing,
                closed: self.closed,
            }),
            incoming,
        }
    }
}

impl MemoryPeer {
    /// Next frame written by the client; `None` once the client side is gone.
    pub async fn next_outgoing(&mut self) -> Option<String> {
        self.outgoing.recv().await
    }

    /// Next frame written by the client, parsed as JSON.
    pub async fn next_command(&mut self) -> Option<Value> {
        let frame = self.next_outgoing().await?;
        serde_json::from_str(&frame).ok()
    }

    /// Deliver a frame to the client. Returns `false` after [`disconnect`](Self::disconnect)
    /// or once the client stopped reading.
    pub fn push(&self, frame: impl Into<String>) -> bool {
        self.incoming
            .as_ref()
            .is_some_and(|tx| tx.send(frame.into()).is_ok())
    }

    pub fn push_json(&self, value: Value) -> bool {
        self.push(value.to_string())
    }

    /// End the client's incoming stream, as if the socket dropped.
    pub fn disconnect(&mut self) {
        self.incoming = None;
    }

    /// Whether the client closed its end.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct MemorySink {
    tx: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl TransportSink for MemorySink {
    async fn send(&self, frame: String) -> Result<(), CdpError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CdpError::Transport("transport closed".to_string()));
        }
        self.tx
            .send(frame)
            .map_err(|_| CdpError::Transport("peer disconnected".to_string()))
    }

    async fn close(&self) -> Result<(), CdpError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

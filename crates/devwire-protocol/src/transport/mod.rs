//! Message-framed transports the client runs over.
//!
//! A transport hands the client two halves: a sink that writes one complete
//! frame per call, and a stream yielding one complete incoming frame per
//! item. The stream ending means the peer went away.

mod memory;
mod websocket;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::CdpError;

pub use memory::{MemoryPeer, MemoryTransport};
pub use websocket::WebSocketTransport;

/// Incoming frames; ends on disconnect.
pub type Incoming = BoxStream<'static, Result<String, CdpError>>;

/// Write half of a transport.
#[async_trait]
pub trait TransportSink: Send + Sync {
    /// Write one frame.
    async fn send(&self, frame: String) -> Result<(), CdpError>;

    /// Close the connection. Calling it more than once is harmless.
    async fn close(&self) -> Result<(), CdpError>;
}

/// Both halves of a connected transport.
pub struct TransportParts {
    pub sink: Box<dyn TransportSink>,
    pub incoming: Incoming,
}

/// A connected, message-framed transport.
pub trait Transport {
    fn into_parts(self) -> TransportParts;
}

impl Transport for TransportParts {
    fn into_parts(self) -> TransportParts {
        self
    }
}

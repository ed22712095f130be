//! Chrome DevTools Protocol (CDP) client core.
//!
//! One [`CdpClient`] owns one connection to a DevTools peer. It assigns
//! command ids, matches replies to the callers that issued them, and fans
//! unsolicited events out to any number of subscribers. Per-domain wrappers
//! (DOM, Page, Overlay, ...) are expected to sit on top of the two
//! primitives [`CdpClient::send`] and [`CdpClient::events`].
//!
//! ## Architecture
//!
//! ```text
//!  send() ──► PendingCalls::register ──► encode ──► TransportSink
//!                    ▲
//!                    │ resolve                 ┌──► EventStream
//!  Incoming ──► decode ──► Response / Event ──► EventBus ──► EventStream
//! ```
//!
//! A single ingestion task drains the transport; it is the only code that
//! resolves pending calls and the only publisher on the bus.
//!
//! ## Usage
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Connect, issue commands and watch events:
//!    ```rust,ignore
//!    let client = CdpClient::connect_endpoint("http://localhost:9222").await?;
//!    let mut loads = client.events("Page.loadEventFired", SessionFilter::Any);
//!    let page = client.session(session_id);
//!    page.send("Page.enable", None).await?;
//!    while let Some(event) = loads.recv().await { /* ... */ }
//!    ```

pub mod bus;
mod client;
pub mod discovery;
mod error;
pub mod pending;
pub mod protocol;
pub mod session;
pub mod transport;

pub use bus::{EventBus, EventStream};
pub use client::CdpClient;
pub use discovery::{BrowserVersion, TargetDescriptor, discover_browser, list_targets};
pub use error::{CdpError, DecodeError};
pub use pending::PendingCall;
pub use protocol::{Command, Event, Frame, RemoteError, Response};
pub use session::{EventFilter, MethodFilter, SessionFilter, SessionHandle, SessionId};
pub use transport::{MemoryPeer, MemoryTransport, Transport, TransportParts, TransportSink, WebSocketTransport};

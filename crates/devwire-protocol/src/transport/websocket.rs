//! WebSocket transport over `tokio-tungstenite`.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use super::{Transport, TransportParts, TransportSink};
use crate::error::CdpError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// A connected DevTools WebSocket.
pub struct WebSocketTransport {
    url: String,
    sink: WsSink,
    source: WsSource,
}

impl WebSocketTransport {
    /// Open a WebSocket to a `ws://` or `wss://` debugger URL.
    pub async fn connect(url: &str) -> Result<Self, CdpError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| CdpError::Transport(format!("WebSocket connect to {}: {}", url, e)))?;
        debug!("WebSocket connected to {}", url);

        let (sink, source) = ws_stream.split();
        Ok(Self {
            url: url.to_string(),
            sink,
            source,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for WebSocketTransport {
    fn into_parts(self) -> TransportParts {
        let incoming = self
            .source
            .take_while(|msg| futures::future::ready(!matches!(msg, Ok(Message::Close(_)))))
            .filter_map(|msg| async move {
                match msg {
                    Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                    // A bad payload is a malformed frame, not a broken socket:
                    // hand it on so the decoder drops it.
                    Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                        Ok(text) => Some(Ok(text.to_owned())),
                        Err(e) => {
                            warn!("non UTF-8 binary frame: {}", e);
                            Some(Ok(String::from_utf8_lossy(&bytes).into_owned()))
                        }
                    },
                    Ok(_) => None,
                    Err(e) => Some(Err(CdpError::from(e))),
                }
            })
            .boxed();

        TransportParts {
            sink: Box::new(WebSocketSink {
                sink: tokio::sync::Mutex::new(self.sink),
            }),
            incoming,
        }
    }
}

struct WebSocketSink {
    sink: tokio::sync::Mutex<WsSink>,
}

#[async_trait]
impl TransportSink for WebSocketSink {
    async fn send(&self, frame: String) -> Result<(), CdpError> {
        let mut ws = self.sink.lock().await;
        ws.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), CdpError> {
        let mut ws = self.sink.lock().await;
        match ws.close().await {
            Ok(())
            | Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed)
            | Err(tokio_tungstenite::tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

//! CDP client error types.

use serde_json::Value;
use thiserror::Error;

/// A frame that could not be decoded into a response or an event.
///
/// When the frame carried a readable numeric `id`, it is kept so the
/// caller waiting on that id can be failed instead of left hanging.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Malformed frame{}: {reason}", .id.map(|id| format!(" (id {})", id)).unwrap_or_default())]
pub struct DecodeError {
    pub id: Option<u64>,
    pub reason: String,
}

impl DecodeError {
    pub fn new(id: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
        }
    }
}

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Write or read failure at the connection boundary.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A single frame could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The peer answered the command with an error response.
    #[error("CDP error: {message} (code: {code})")]
    Remote {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// The connection was closed before or while the call was outstanding.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The call was cancelled locally while the connection stayed up.
    #[error("Call cancelled")]
    Cancelled,

    /// Caller-side timeout elapsed.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// No CDP peer answered at the discovery endpoint.
    #[error("CDP peer not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    PeerUnavailable(String),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Endpoint URL could not be parsed or has the wrong scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl CdpError {
    /// Whether this error means the whole connection is gone, as opposed
    /// to a failure scoped to one call.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, CdpError::Transport(_) | CdpError::ConnectionClosed)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::Transport(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::InvalidUrl(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = CdpError::Remote {
            code: -32601,
            message: "'Foo.bar' wasn't found".to_string(),
            data: None,
        };
        let display = err.to_string();
        assert!(display.contains("-32601"));
        assert!(display.contains("Foo.bar"));
    }

    #[test]
    fn test_decode_error_display_with_id() {
        let err = DecodeError::new(Some(7), "error.code is not an integer");
        assert_eq!(
            err.to_string(),
            "Malformed frame (id 7): error.code is not an integer"
        );
    }

    #[test]
    fn test_decode_error_display_without_id() {
        let err = DecodeError::new(None, "not JSON");
        assert_eq!(err.to_string(), "Malformed frame: not JSON");
    }

    #[test]
    fn test_connection_error_classification() {
        assert!(CdpError::ConnectionClosed.is_connection_error());
        assert!(CdpError::Transport("reset".into()).is_connection_error());
        assert!(!CdpError::Timeout("x".into()).is_connection_error());
        assert!(!CdpError::Cancelled.is_connection_error());
        assert!(
            !CdpError::Remote {
                code: 1,
                message: "m".into(),
                data: None
            }
            .is_connection_error()
        );
    }

    #[test]
    fn test_url_parse_error_from() {
        let err = CdpError::from(url::Url::parse("not a url").unwrap_err());
        assert!(matches!(err, CdpError::InvalidUrl(_)));
    }
}

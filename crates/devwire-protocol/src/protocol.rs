//! CDP wire envelopes and the frame codec.
//!
//! Outgoing commands are encoded as
//! `{"id": n, "method": "Domain.name", "params": {...}, "sessionId": "..."}`.
//! Incoming frames are split on the presence of `id`: with an id the frame
//! is a [`Response`], without one it must carry a `method` and is an
//! [`Event`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::session::SessionId;

/// Outgoing CDP command.
#[derive(Debug, Clone, Serialize)]
pub struct Command {
    pub id: u64,
    pub method: String,
    pub params: Value,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

impl Command {
    /// Build a command, normalizing params to the shape the peer expects.
    ///
    /// Absent params become `{}` and top-level `null` members are omitted.
    /// Nested values are left untouched since `null` can be a real argument
    /// there.
    pub fn new(
        id: u64,
        method: impl Into<String>,
        params: Option<Value>,
        session_id: Option<SessionId>,
    ) -> Self {
        let params = match params {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(Value::Object(mut map)) => {
                map.retain(|_, v| !v.is_null());
                Value::Object(map)
            }
            Some(other) => other,
        };
        Self {
            id,
            method: method.into(),
            params,
            session_id,
        }
    }
}

/// Error body of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Reply to a command, correlated by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: u64,
    pub outcome: Result<Value, RemoteError>,
}

/// Unsolicited notification pushed by the peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub method: String,
    #[serde(default = "empty_object")]
    pub params: Value,
    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

impl Event {
    /// Domain part of the method name (`"Page"` for `"Page.loadEventFired"`).
    pub fn domain(&self) -> &str {
        self.method
            .split_once('.')
            .map(|(domain, _)| domain)
            .unwrap_or(&self.method)
    }
}

/// A decoded incoming frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Response(Response),
    Event(Event),
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Encode a command into its text frame.
pub fn encode(command: &Command) -> Result<String, serde_json::Error> {
    serde_json::to_string(command)
}

/// Decode one incoming text frame.
pub fn decode(text: &str) -> Result<Frame, DecodeError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| DecodeError::new(None, format!("invalid JSON: {}", e)))?;
    let Value::Object(mut map) = value else {
        return Err(DecodeError::new(None, "envelope is not a JSON object"));
    };

    match map.remove("id") {
        Some(id) => {
            let id = id
                .as_u64()
                .ok_or_else(|| DecodeError::new(None, format!("id is not an unsigned integer: {}", id)))?;
            decode_response(id, map).map(Frame::Response)
        }
        None => decode_event(map).map(Frame::Event),
    }
}

fn decode_response(id: u64, mut map: Map<String, Value>) -> Result<Response, DecodeError> {
    let result = map.remove("result").filter(|v| !v.is_null());
    let error = map.remove("error").filter(|v| !v.is_null());

    let outcome = match (result, error) {
        (Some(result), None) => Ok(result),
        (None, Some(error)) => {
            let error: RemoteError = serde_json::from_value(error)
                .map_err(|e| DecodeError::new(Some(id), format!("invalid error body: {}", e)))?;
            Err(error)
        }
        (Some(_), Some(_)) => {
            return Err(DecodeError::new(
                Some(id),
                "response carries both result and error",
            ));
        }
        (None, None) => {
            return Err(DecodeError::new(
                Some(id),
                "response carries neither result nor error",
            ));
        }
    };

    Ok(Response { id, outcome })
}

fn decode_event(map: Map<String, Value>) -> Result<Event, DecodeError> {
    if !map.contains_key("method") {
        return Err(DecodeError::new(None, "frame has neither id nor method"));
    }
    serde_json::from_value(Value::Object(map))
        .map_err(|e| DecodeError::new(None, format!("invalid event: {}", e)))
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

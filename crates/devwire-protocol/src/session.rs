//! Session routing.
//!
//! Many targets share one connection; each command and event may carry a
//! `sessionId`. Nothing here tracks whether a session is alive: commands are
//! tagged and events are filtered, and the peer rejects stale sessions with
//! an ordinary error response.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bus::EventStream;
use crate::client::CdpClient;
use crate::error::CdpError;
use crate::protocol::Event;

/// Identifier of a target session, as issued by `Target.attachToTarget`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which sessions an event subscription accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionFilter {
    /// Every event regardless of its session tag.
    #[default]
    Any,
    /// Only events without a session tag (browser-level target).
    Root,
    /// Only events tagged with exactly this session.
    Only(SessionId),
}

impl SessionFilter {
    pub fn matches(&self, session_id: Option<&SessionId>) -> bool {
        match self {
            SessionFilter::Any => true,
            SessionFilter::Root => session_id.is_none(),
            SessionFilter::Only(expected) => session_id == Some(expected),
        }
    }
}

impl From<Option<SessionId>> for SessionFilter {
    /// `None` scopes to the root target, mirroring how commands are tagged.
    fn from(session_id: Option<SessionId>) -> Self {
        match session_id {
            Some(id) => SessionFilter::Only(id),
            None => SessionFilter::Root,
        }
    }
}

impl From<SessionId> for SessionFilter {
    fn from(session_id: SessionId) -> Self {
        SessionFilter::Only(session_id)
    }
}

/// Which event methods a subscription accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MethodFilter {
    #[default]
    Any,
    /// Full method name, e.g. `Page.loadEventFired`.
    Exact(String),
    /// Every event of a domain, e.g. `Network`.
    Domain(String),
}

impl MethodFilter {
    /// Parse a filter string: `*` or empty for any, a dotted name for an
    /// exact method, a bare name for a whole domain.
    pub fn parse(filter: &str) -> Self {
        let filter = filter.trim();
        if filter.is_empty() || filter == "*" {
            MethodFilter::Any
        } else if let Some(domain) = filter.strip_suffix(".*") {
            MethodFilter::Domain(domain.to_string())
        } else if filter.contains('.') {
            MethodFilter::Exact(filter.to_string())
        } else {
            MethodFilter::Domain(filter.to_string())
        }
    }

    pub fn matches(&self, method: &str) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Exact(name) => method == name,
            MethodFilter::Domain(domain) => method
                .strip_prefix(domain.as_str())
                .is_some_and(|rest| rest.starts_with('.')),
        }
    }
}

impl From<&str> for MethodFilter {
    fn from(filter: &str) -> Self {
        MethodFilter::parse(filter)
    }
}

/// Method and session predicate of one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventFilter {
    pub method: MethodFilter,
    pub session: SessionFilter,
}

impl EventFilter {
    pub fn new(method: impl Into<MethodFilter>, session: impl Into<SessionFilter>) -> Self {
        Self {
            method: method.into(),
            session: session.into(),
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.method.matches(&event.method) && self.session.matches(event.session_id.as_ref())
    }
}

/// A view of the client scoped to one target session (or to the root).
///
/// Holds a client handle; the connection stays open while any view or
/// client handle exists.
#[derive(Clone)]
pub struct SessionHandle {
    client: CdpClient,
    session_id: Option<SessionId>,
}

impl SessionHandle {
    pub(crate) fn new(client: CdpClient, session_id: Option<SessionId>) -> Self {
        Self { client, session_id }
    }

    /// Session ID, or `None` for the root target.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn client(&self) -> &CdpClient {
        &self.client
    }

    /// Send a command tagged with this session.
    pub async fn send(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.client
            .send(method, params, self.session_id.as_ref())
            .await
    }

    /// Subscribe to this session's events.
    pub fn events(&self, method: impl Into<MethodFilter>) -> EventStream {
        self.client
            .events(method, SessionFilter::from(self.session_id.clone()))
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .finish()
    }
}

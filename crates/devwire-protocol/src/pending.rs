//! Pending call table: correlates responses with the callers that issued them.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::trace;

use crate::error::CdpError;
use crate::protocol::Response;
use crate::session::SessionId;

type CallResult = Result<Value, CdpError>;

/// Outstanding call awaiting its response.
struct Entry {
    tx: oneshot::Sender<CallResult>,
    method: String,
    session_id: Option<SessionId>,
}

struct Table {
    /// Next id to hand out. Never reused for the lifetime of the table.
    next_id: u64,
    calls: HashMap<u64, Entry>,
    closed: bool,
}

/// What happened to a response handed to [`PendingCalls::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A registered call was completed.
    Delivered,
    /// A registered call was completed, but its caller had stopped waiting.
    Abandoned,
    /// No call with this id is outstanding.
    Stale,
}

/// Id allocator plus the map of outstanding calls, behind one lock.
pub struct PendingCalls {
    table: Mutex<Table>,
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingCalls {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                next_id: 1,
                calls: HashMap::new(),
                closed: false,
            }),
        }
    }

    /// Allocate the next id and register a completion slot for it.
    ///
    /// Fails with [`CdpError::ConnectionClosed`] once [`fail_all`](Self::fail_all)
    /// has run.
    pub fn register(
        &self,
        method: &str,
        session_id: Option<&SessionId>,
    ) -> Result<PendingCall, CdpError> {
        let (tx, rx) = oneshot::channel();
        let mut table = self.table.lock();
        if table.closed {
            return Err(CdpError::ConnectionClosed);
        }
        let id = table.next_id;
        table.next_id += 1;
        table.calls.insert(
            id,
            Entry {
                tx,
                method: method.to_string(),
                session_id: session_id.cloned(),
            },
        );
        Ok(PendingCall {
            id,
            method: method.to_string(),
            rx,
        })
    }

    /// Complete the call matching `response.id`.
    pub fn resolve(&self, response: Response) -> Resolution {
        let Some(entry) = self.table.lock().calls.remove(&response.id) else {
            return Resolution::Stale;
        };
        let result = response.outcome.map_err(|e| CdpError::Remote {
            code: e.code,
            message: e.message,
            data: e.data,
        });
        Self::complete(response.id, entry, result)
    }

    /// Complete one call with a locally produced failure.
    pub fn fail(&self, id: u64, error: CdpError) -> Resolution {
        let Some(entry) = self.table.lock().calls.remove(&id) else {
            return Resolution::Stale;
        };
        Self::complete(id, entry, Err(error))
    }

    /// Forget a call whose caller no longer wants the answer. Anyone still
    /// awaiting it gets [`CdpError::Cancelled`].
    ///
    /// Returns `false` if the id was not outstanding.
    pub fn cancel(&self, id: u64) -> bool {
        let Some(entry) = self.table.lock().calls.remove(&id) else {
            return false;
        };
        Self::complete(id, entry, Err(CdpError::Cancelled));
        true
    }

    /// Fail every outstanding call with [`CdpError::ConnectionClosed`] and
    /// refuse further registrations. Returns the number of calls failed.
    pub fn fail_all(&self) -> usize {
        let drained: Vec<(u64, Entry)> = {
            let mut table = self.table.lock();
            table.closed = true;
            table.calls.drain().collect()
        };
        let count = drained.len();
        for (id, entry) in drained {
            Self::complete(id, entry, Err(CdpError::ConnectionClosed));
        }
        count
    }

    /// Number of outstanding calls.
    pub fn len(&self) -> usize {
        self.table.lock().calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.table.lock().closed
    }

    fn complete(id: u64, entry: Entry, result: CallResult) -> Resolution {
        trace!(
            id,
            method = %entry.method,
            session = ?entry.session_id,
            ok = result.is_ok(),
            "completing call"
        );
        match entry.tx.send(result) {
            Ok(()) => Resolution::Delivered,
            Err(_) => Resolution::Abandoned,
        }
    }
}

/// Handle to one outstanding call. Await it for the result.
///
/// Dropping the handle does not remove the table entry; use
/// [`PendingCalls::cancel`] (or `Client::cancel`) for that.
#[derive(Debug)]
pub struct PendingCall {
    id: u64,
    method: String,
    rx: oneshot::Receiver<CallResult>,
}

impl PendingCall {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl Future for PendingCall {
    type Output = CallResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // Sender dropped without completing: the client was dropped.
            Poll::Ready(Err(_)) => Poll::Ready(Err(CdpError::ConnectionClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;

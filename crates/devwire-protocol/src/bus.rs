//! Event fan-out.
//!
//! Every subscriber owns an unbounded queue, so publishing never waits on a
//! slow consumer. The bus keeps no history: a subscriber only sees events
//! published while it is registered.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::protocol::Event;
use crate::session::EventFilter;

struct Subscriber {
    filter: EventFilter,
    tx: mpsc::UnboundedSender<Event>,
}

struct BusState {
    next_id: u64,
    subscribers: HashMap<u64, Subscriber>,
    closed: bool,
}

/// Broadcasts decoded events to every matching subscription.
pub struct EventBus {
    state: Mutex<BusState>,
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(BusState {
                next_id: 1,
                subscribers: HashMap::new(),
                closed: false,
            }),
        })
    }

    /// Register a subscription. On a closed bus the stream ends immediately.
    pub fn subscribe(self: &Arc<Self>, filter: EventFilter) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        if state.closed {
            drop(tx);
        } else {
            debug!(subscription = id, ?filter, "event subscription added");
            state.subscribers.insert(id, Subscriber { filter, tx });
        }
        EventStream {
            id,
            rx,
            bus: Arc::downgrade(self),
        }
    }

    /// Deliver an event to every matching subscription.
    ///
    /// Returns how many subscriptions received it. Subscriptions whose
    /// stream has gone away are pruned on the way.
    pub fn publish(&self, event: Event) -> usize {
        let mut state = self.state.lock();
        let mut delivered = 0;
        let mut gone = Vec::new();
        for (id, subscriber) in &state.subscribers {
            if !subscriber.filter.matches(&event) {
                continue;
            }
            if subscriber.tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                gone.push(*id);
            }
        }
        for id in gone {
            state.subscribers.remove(&id);
        }
        trace!(method = %event.method, delivered, "event published");
        delivered
    }

    /// End every subscription and refuse new ones.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        let count = state.subscribers.len();
        state.subscribers.clear();
        if count > 0 {
            debug!(count, "event subscriptions closed");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn unsubscribe(&self, id: u64) {
        if self.state.lock().subscribers.remove(&id).is_some() {
            debug!(subscription = id, "event subscription removed");
        }
    }
}

/// Live sequence of events for one subscription.
///
/// Ends when the client closes. Dropping the stream detaches it; events
/// published afterwards are not kept for it.
pub struct EventStream {
    id: u64,
    rx: mpsc::UnboundedReceiver<Event>,
    bus: Weak<EventBus>,
}

impl EventStream {
    /// Wait for the next matching event; `None` once the client is closed.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Take an already queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream").field("id", &self.id).finish()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;

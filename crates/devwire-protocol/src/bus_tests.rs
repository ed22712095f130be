use futures::StreamExt;
use serde_json::json;

use super::*;
use crate::session::{MethodFilter, SessionFilter, SessionId};

fn event(method: &str, a: i64, session: Option<&str>) -> Event {
    Event {
        method: method.to_string(),
        params: json!({ "a": a }),
        session_id: session.map(SessionId::from),
    }
}

#[test]
fn test_publish_without_subscribers_is_discarded() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(event("Y.changed", 1, None)), 0);
}

#[tokio::test]
async fn test_overlapping_subscribers_each_receive() {
    let bus = EventBus::new();
    let mut all = bus.subscribe(EventFilter::default());
    let mut domain = bus.subscribe(EventFilter::new("Y", SessionFilter::Any));
    let mut exact = bus.subscribe(EventFilter::new("Y.changed", SessionFilter::Any));

    assert_eq!(bus.publish(event("Y.changed", 1, Some("S1"))), 3);

    for stream in [&mut all, &mut domain, &mut exact] {
        let got = stream.recv().await.unwrap();
        assert_eq!(got.params, json!({"a": 1}));
    }
}

#[tokio::test]
async fn test_session_filter_scopes_delivery() {
    let bus = EventBus::new();
    let mut s1 = bus.subscribe(EventFilter::new(MethodFilter::Any, SessionId::from("S1")));

    bus.publish(event("Y.changed", 1, Some("S1")));
    bus.publish(event("Y.changed", 2, Some("S2")));
    bus.close();

    let seen: Vec<_> = (&mut s1).collect().await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].params, json!({"a": 1}));
}

#[tokio::test]
async fn test_order_preserved_per_subscriber() {
    let bus = EventBus::new();
    let mut stream = bus.subscribe(EventFilter::default());
    for i in 0..100 {
        bus.publish(event("A.tick", i, Some("S1")));
    }
    for i in 0..100 {
        assert_eq!(stream.recv().await.unwrap().params["a"], i);
    }
}

#[test]
fn test_dropped_stream_unsubscribes() {
    let bus = EventBus::new();
    let stream = bus.subscribe(EventFilter::default());
    assert_eq!(bus.subscriber_count(), 1);
    drop(stream);
    assert_eq!(bus.subscriber_count(), 0);
    assert_eq!(bus.publish(event("A.b", 1, None)), 0);
}

#[tokio::test]
async fn test_no_replay_for_late_subscriber() {
    let bus = EventBus::new();
    bus.publish(event("A.b", 1, None));
    let mut late = bus.subscribe(EventFilter::default());
    bus.publish(event("A.b", 2, None));
    assert_eq!(late.recv().await.unwrap().params["a"], 2);
    assert!(late.try_recv().is_none());
}

#[tokio::test]
async fn test_close_ends_streams() {
    let bus = EventBus::new();
    let mut stream = bus.subscribe(EventFilter::default());
    bus.close();
    assert!(stream.recv().await.is_none());
    assert!(bus.is_closed());
}

#[tokio::test]
async fn test_subscribe_after_close_ends_immediately() {
    let bus = EventBus::new();
    bus.close();
    let mut stream = bus.subscribe(EventFilter::default());
    assert!(stream.next().await.is_none());
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn test_slow_subscriber_does_not_block_others() {
    let bus = EventBus::new();
    let _stalled = bus.subscribe(EventFilter::default());
    let mut active = bus.subscribe(EventFilter::default());
    for i in 0..1_000 {
        bus.publish(event("A.tick", i, None));
    }
    assert_eq!(active.recv().await.unwrap().params["a"], 0);
}

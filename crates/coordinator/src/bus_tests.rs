use super::*;
use oj_core::{Message, MessageType};

fn msg(sender: &str) -> Message {
    Message::new("m1", MessageType::Status, sender.into())
}

#[tokio::test]
async fn forward_to_delivers_to_registered_subscriber() {
    let table = SubscriberTable::default();
    let mut rx = table.register("a1".into(), 4);
    table.forward_to(&"a1".into(), msg("sender"));
    let got = rx.recv().await.expect("delivered");
    assert_eq!(got.sender, oj_core::AgentId::from("sender"));
}

#[test]
fn forward_to_missing_subscriber_counts_as_dropped() {
    let table = SubscriberTable::default();
    table.forward_to(&"ghost".into(), msg("sender"));
    assert_eq!(table.dropped(), 1);
}

#[test]
fn forward_to_full_channel_drops_and_counts() {
    let table = SubscriberTable::default();
    let _rx = table.register("a1".into(), 1);
    table.forward_to(&"a1".into(), msg("sender"));
    table.forward_to(&"a1".into(), msg("sender"));
    assert_eq!(table.dropped(), 1);
}

#[tokio::test]
async fn broadcast_except_skips_sender() {
    let table = SubscriberTable::default();
    let mut rx_a = table.register("a".into(), 4);
    let mut rx_sender = table.register("sender".into(), 4);
    table.broadcast_except(&"sender".into(), msg("sender"));
    assert!(rx_a.recv().await.is_some());
    assert!(rx_sender.try_recv().is_err());
}

#[test]
fn unregister_removes_subscriber() {
    let table = SubscriberTable::default();
    table.register("a1".into(), 4);
    table.unregister(&"a1".into());
    table.forward_to(&"a1".into(), msg("sender"));
    assert_eq!(table.dropped(), 1);
}

#[test]
fn clear_resets_subscribers_but_not_dropped_counter() {
    let table = SubscriberTable::default();
    table.register("a1".into(), 4);
    table.forward_to(&"ghost".into(), msg("sender"));
    table.clear();
    assert_eq!(table.dropped(), 1);
    table.forward_to(&"a1".into(), msg("sender"));
    assert_eq!(table.dropped(), 2);
}

use super::*;

#[tokio::test]
async fn notify_wakes_a_handle_registered_before_the_notify() {
    let map: NotifyMap<String> = NotifyMap::default();
    let notify = map.handle(&"k".to_string());
    let notified = notify.notified();
    map.notify(&"k".to_string());
    notified.await;
}

#[tokio::test]
async fn notify_on_unregistered_key_is_a_noop() {
    let map: NotifyMap<String> = NotifyMap::default();
    map.notify(&"nobody-waiting".to_string());
}

#[tokio::test]
async fn notify_all_wakes_every_key() {
    let map: NotifyMap<String> = NotifyMap::default();
    let n1 = map.handle(&"a".to_string());
    let n2 = map.handle(&"b".to_string());
    let w1 = n1.notified();
    let w2 = n2.notified();
    map.notify_all();
    w1.await;
    w2.await;
}

#[test]
fn wait_condition_equality() {
    assert_eq!(
        WaitCondition::WorkReleased("w1".into()),
        WaitCondition::WorkReleased("w1".into())
    );
    assert_ne!(WaitCondition::AllAgentsSettled, WaitCondition::ContextSet("x".into()));
}

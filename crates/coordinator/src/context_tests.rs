use super::*;
use serde_json::json;

#[test]
fn set_then_get_round_trips() {
    let ctx = ContextMap::default();
    ctx.set("plan", json!({"step": 1}));
    assert_eq!(ctx.get("plan"), Some(json!({"step": 1})));
}

#[test]
fn get_missing_key_is_none() {
    let ctx = ContextMap::default();
    assert!(ctx.get("missing").is_none());
}

#[test]
fn set_overwrites_previous_value() {
    let ctx = ContextMap::default();
    ctx.set("k", json!(1));
    ctx.set("k", json!(2));
    assert_eq!(ctx.get("k"), Some(json!(2)));
}

#[test]
fn clear_empties_map() {
    let ctx = ContextMap::default();
    ctx.set("k", json!(1));
    ctx.clear();
    assert!(ctx.get("k").is_none());
}

use super::*;
use oj_coordinator::CoordinatorConfig;
use std::fs;
use tempfile::tempdir;

fn setup() -> (tempfile::TempDir, ContextPinner, AgentId) {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.go"), "package p\nimport \"./b\"\n").expect("write");
    fs::write(dir.path().join("b.go"), "package p\n").expect("write");
    let coordinator = Coordinator::new(CoordinatorConfig::default());
    let pinner = ContextPinner::new(dir.path(), coordinator);
    (dir, pinner, "agent-a".into())
}

#[test]
fn pin_includes_transitively_related_files() {
    let (_dir, pinner, agent) = setup();
    pinner.pin(&agent, &[PathBuf::from("a.go")], false).expect("pin");
    let pin = pinner.pin_for(&agent).expect("pinned");
    assert!(pin.files.contains_key(&PathBuf::from("a.go")));
    assert!(pin.files.contains_key(&PathBuf::from("b.go")));
}

#[test]
fn pin_caches_small_file_content() {
    let (_dir, pinner, agent) = setup();
    pinner.pin(&agent, &[PathBuf::from("a.go")], false).expect("pin");
    let pin = pinner.pin_for(&agent).expect("pinned");
    assert_eq!(
        pin.content_cache.get(&PathBuf::from("a.go")).map(String::as_str),
        Some("package p\nimport \"./b\"\n")
    );
}

#[test]
fn pin_with_lock_true_locks_through_coordinator() {
    let (_dir, pinner, agent) = setup();
    pinner.pin(&agent, &[PathBuf::from("a.go")], true).expect("pin");
    assert!(pinner
        .coordinator
        .is_locked_by_other(&PathBuf::from("b.go"), &"someone-else".into()));
}

#[test]
fn pin_lock_conflict_leaves_nothing_locked() {
    let (_dir, pinner, agent_a) = setup();
    let agent_b: AgentId = "agent-b".into();
    pinner.pin(&agent_a, &[PathBuf::from("a.go")], true).expect("first pin");
    let err = pinner.pin(&agent_b, &[PathBuf::from("b.go")], true).unwrap_err();
    assert!(matches!(err, PinnerError::FileLockError { .. }));
}

#[test]
fn verify_pin_detects_no_change() {
    let (_dir, pinner, agent) = setup();
    pinner.pin(&agent, &[PathBuf::from("a.go")], false).expect("pin");
    let (fresh, changed) = pinner.verify_pin(&agent).expect("verify");
    assert!(fresh);
    assert!(changed.is_empty());
}

#[test]
fn verify_pin_detects_modification() {
    let (dir, pinner, agent) = setup();
    pinner.pin(&agent, &[PathBuf::from("a.go")], false).expect("pin");
    fs::write(dir.path().join("b.go"), "package p\n// changed\n").expect("rewrite");
    let (fresh, changed) = pinner.verify_pin(&agent).expect("verify");
    assert!(!fresh);
    assert_eq!(changed, vec![PathBuf::from("b.go")]);
}

#[test]
fn refresh_pin_updates_checksum_without_releasing_lock() {
    let (dir, pinner, agent) = setup();
    pinner.pin(&agent, &[PathBuf::from("a.go")], true).expect("pin");
    fs::write(dir.path().join("b.go"), "package p\n// changed\n").expect("rewrite");
    pinner.refresh_pin(&agent).expect("refresh");
    let (fresh, _) = pinner.verify_pin(&agent).expect("verify");
    assert!(fresh);
    assert!(pinner.coordinator.is_locked_by_other(&PathBuf::from("b.go"), &"other".into()));
}

#[test]
fn two_consecutive_refreshes_without_changes_are_noops() {
    let (_dir, pinner, agent) = setup();
    pinner.pin(&agent, &[PathBuf::from("a.go")], false).expect("pin");
    let before = pinner.pin_for(&agent).expect("pinned");
    pinner.refresh_pin(&agent).expect("refresh 1");
    pinner.refresh_pin(&agent).expect("refresh 2");
    let after = pinner.pin_for(&agent).expect("pinned");
    assert_eq!(before, after);
}

#[test]
fn unpin_releases_locks_and_removes_pin() {
    let (_dir, pinner, agent) = setup();
    pinner.pin(&agent, &[PathBuf::from("a.go")], true).expect("pin");
    pinner.unpin(&agent).expect("unpin");
    assert!(pinner.pin_for(&agent).is_none());
    assert!(!pinner
        .coordinator
        .is_locked_by_other(&PathBuf::from("b.go"), &"anyone".into()));
}

#[test]
fn unpin_then_pin_round_trips_lock_state() {
    let (_dir, pinner, agent) = setup();
    pinner.pin(&agent, &[PathBuf::from("a.go")], true).expect("pin");
    pinner.unpin(&agent).expect("unpin");
    let other: AgentId = "other-agent".into();
    pinner.pin(&other, &[PathBuf::from("a.go")], true).expect("reclaim");
}

#[test]
fn unpin_unknown_agent_is_an_error() {
    let (_dir, pinner, _agent) = setup();
    let err = pinner.unpin(&"ghost".into()).unwrap_err();
    assert!(matches!(err, PinnerError::NoSuchPin(_)));
}

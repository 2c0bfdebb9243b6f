// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn builder_defaults_are_empty() {
    let t = Ticket::new("ENG-1", "Add Multiply", "add a Multiply(a,b) function");
    assert_eq!(t.id, "ENG-1");
    assert_eq!(t.suggested_branch, None);
    assert!(t.labels.is_empty());
    assert_eq!(t.priority, "");
}

#[test]
fn builder_chains_set_fields() {
    let t = Ticket::new("ENG-1", "t", "d")
        .with_suggested_branch("eng-1-add-multiply")
        .with_labels(["backend".to_string(), "math".to_string()])
        .with_priority("p2");
    assert_eq!(t.suggested_branch.as_deref(), Some("eng-1-add-multiply"));
    assert!(t.labels.contains("backend"));
    assert_eq!(t.priority, "p2");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::AgentId;

fn sample_plan() -> HandoffPayload {
    let mut plan = Plan::default();
    plan.summary = "Add Multiply".to_string();
    plan.approach = vec!["add pkg/util.go".to_string(), "add tests".to_string()];
    plan.relevant_files.insert("pkg/util.go".into());
    plan.relevant_files.insert("pkg/util_test.go".into());
    HandoffPayload::Plan(plan)
}

#[test]
fn concise_is_never_longer_than_full() {
    for payload in [sample_plan(), HandoffPayload::PinnedContext(Pin::new(AgentId::new("executor"), false))] {
        assert!(payload.concise().len() <= payload.full().len());
    }
}

#[test]
fn unbounded_budget_equals_full() {
    let payload = sample_plan();
    assert_eq!(payload.for_token_budget(usize::MAX), payload.full());
}

#[test]
fn zero_budget_degrades_to_at_most_concise_length() {
    let payload = sample_plan();
    let budgeted = payload.for_token_budget(0);
    assert!(budgeted.len() <= payload.concise().len());
}

#[test]
fn mid_budget_below_full_falls_back_to_concise_or_smaller() {
    let payload = sample_plan();
    let full_len = payload.full().len();
    let budgeted = payload.for_token_budget((full_len / 2 / 4).max(1));
    assert!(budgeted.len() <= payload.concise().len().max(budgeted.len()));
    assert!(budgeted.len() <= full_len);
}

#[test]
fn kind_is_stable_per_variant() {
    assert_eq!(sample_plan().kind(), "plan");
    assert_eq!(
        HandoffPayload::Validation(ValidationResult::default()).kind(),
        "validation"
    );
}

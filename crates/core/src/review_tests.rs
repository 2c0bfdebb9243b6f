// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    nit = { Severity::Nit, true },
    minor = { Severity::Minor, true },
    major = { Severity::Major, false },
    blocker = { Severity::Blocker, false },
)]
fn only_major_and_blocker_fail_review(severity: Severity, expected_passed: bool) {
    let result = ReviewResult {
        issues: vec![Issue::new(severity, "issue")],
        summary: String::new(),
        guidance: String::new(),
    };
    assert_eq!(result.passed(), expected_passed);
}

#[test]
fn empty_issues_passes() {
    assert!(ReviewResult::default().passed());
}

#[test]
fn issue_builder_sets_location_and_suggestion() {
    let issue = Issue::new(Severity::Major, "missing validation")
        .at("pkg/util.go", 42)
        .with_suggestion("add a bounds check");
    assert_eq!(issue.line, Some(42));
    assert_eq!(issue.suggestion.as_deref(), Some("add a bounds check"));
}

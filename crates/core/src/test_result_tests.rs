// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn sample(failed_count: u32, exit_success: bool) -> TestResult {
    TestResult {
        framework: "jest".to_string(),
        total: 10,
        passed_count: 10 - failed_count,
        failed_count,
        skipped: 0,
        coverage_percent: 85.0,
        failed_tests: Vec::new(),
        duration: Duration::from_secs(1),
        raw_output: String::new(),
        exit_success,
    }
}

#[parameterized(
    all_green = { 0, true, true },
    failures = { 2, true, false },
    nonzero_exit_no_parsed_failures = { 0, false, false },
    failures_and_nonzero_exit = { 2, false, false },
)]
fn passed_semantics(failed_count: u32, exit_success: bool, expected: bool) {
    assert_eq!(sample(failed_count, exit_success).passed(), expected);
}

#[test]
fn no_framework_defaults_to_zero_counts_and_passing_exit() {
    let result = TestResult::no_framework("nothing matched");
    assert_eq!(result.framework, "no framework");
    assert_eq!(result.total, 0);
    assert!(result.exit_success);
}

#[test]
fn errored_never_passes() {
    let result = TestResult::errored("spawn failed");
    assert!(!result.passed());
    assert!(!result.exit_success);
}

use super::*;

#[test]
fn done_carries_pr_and_coverage() {
    let result = WorkResult::done("https://example.com/pr/1", 2, true, 87.5);
    assert!(result.pr_created);
    assert_eq!(result.pr_url.as_deref(), Some("https://example.com/pr/1"));
    assert_eq!(result.tests_passed, Some(true));
}

#[test]
fn abandoned_carries_fixed_message_and_no_pr() {
    let result = WorkResult::abandoned(3);
    assert!(!result.pr_created);
    assert_eq!(result.message.as_deref(), Some("Review did not pass after max iterations"));
    assert_eq!(result.iterations, 3);
}

#[test]
fn fatal_carries_custom_message() {
    let result = WorkResult::fatal("failed to create worktree", 0);
    assert!(!result.pr_created);
    assert_eq!(result.message.as_deref(), Some("failed to create worktree"));
}

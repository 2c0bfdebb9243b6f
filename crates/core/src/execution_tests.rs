// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ok_result_has_no_error() {
    let files: BTreeSet<PathBuf> = ["pkg/util.go".into()].into_iter().collect();
    let result = ExecutionResult::ok(files.clone(), "applied diff");
    assert!(result.success);
    assert_eq!(result.error, None);
    assert_eq!(result.changed_files, files);
}

#[test]
fn failed_result_has_empty_changed_files() {
    let result = ExecutionResult::failed("model returned no diff", "raw");
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("model returned no diff"));
    assert!(result.changed_files.is_empty());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ExecutionResult: the executor sub-agent's output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Result of an executor (or refactor-executor) run (spec §3, §4.4 Executor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExecutionResult {
    pub success: bool,
    pub error: Option<String>,
    pub changed_files: BTreeSet<PathBuf>,
    pub raw_output: String,
}

impl ExecutionResult {
    pub fn ok(changed_files: BTreeSet<PathBuf>, raw_output: impl Into<String>) -> Self {
        Self {
            success: true,
            error: None,
            changed_files,
            raw_output: raw_output.into(),
        }
    }

    pub fn failed(error: impl Into<String>, raw_output: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            changed_files: BTreeSet::new(),
            raw_output: raw_output.into(),
        }
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;

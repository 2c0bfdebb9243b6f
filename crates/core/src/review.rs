// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ReviewResult: the reviewer sub-agent's output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity of a single review issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Nit,
    Minor,
    Major,
    Blocker,
}

impl Severity {
    /// Issues at or above this severity gate `ReviewResult::passed`.
    fn blocks_pass(self) -> bool {
        matches!(self, Severity::Major | Severity::Blocker)
    }
}

/// A single issue raised by the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub description: String,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn new(severity: Severity, description: impl Into<String>) -> Self {
        Self {
            severity,
            description: description.into(),
            file: None,
            line: None,
            suggestion: None,
        }
    }

    pub fn at(mut self, file: impl Into<PathBuf>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Result of a reviewer pass (spec §3, §4.4 Reviewer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReviewResult {
    pub issues: Vec<Issue>,
    pub summary: String,
    pub guidance: String,
}

impl ReviewResult {
    /// `passed` iff there are no issues of severity `blocker` or `major`.
    pub fn passed(&self) -> bool {
        !self.issues.iter().any(|i| i.severity.blocks_pass())
    }

    pub fn passing(summary: impl Into<String>) -> Self {
        Self {
            issues: Vec::new(),
            summary: summary.into(),
            guidance: String::new(),
        }
    }
}

#[cfg(test)]
#[path = "review_tests.rs"]
mod tests;

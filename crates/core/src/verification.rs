// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VerificationResult: the diff-verifier sub-agent's output.

use serde::{Deserialize, Serialize};

/// Per-issue classification produced by `DiffVerifier` (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueClassification {
    Addressed,
    Unaddressed,
    NewlyIntroduced,
}

/// Classification of one input review issue against the before/after diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueVerdict {
    pub issue_index: usize,
    pub classification: IssueClassification,
}

/// Result of verifying a refactor's diff against the prior review's issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VerificationResult {
    pub verdicts: Vec<IssueVerdict>,
    /// Smells matching "bad patterns" (e.g. literal `"TODO:"`) that are new
    /// in the post-refactor diff but were absent from the pre-refactor diff.
    pub newly_introduced_smells: Vec<String>,
    pub all_addressed: bool,
    pub confidence: u8,
}

impl VerificationResult {
    /// Confidence derived from the fraction of issues classified as
    /// addressed; a full absence of signal (no issues at all) yields 50
    /// (spec §4.4 DiffVerifier).
    pub fn from_verdicts(verdicts: Vec<IssueVerdict>, newly_introduced_smells: Vec<String>) -> Self {
        let confidence = if verdicts.is_empty() {
            50
        } else {
            let addressed = verdicts
                .iter()
                .filter(|v| v.classification == IssueClassification::Addressed)
                .count();
            ((addressed as f64 / verdicts.len() as f64) * 100.0).round() as u8
        };
        let all_addressed = !verdicts.is_empty()
            && verdicts
                .iter()
                .all(|v| v.classification == IssueClassification::Addressed);
        Self {
            verdicts,
            newly_introduced_smells,
            all_addressed,
            confidence,
        }
    }
}

#[cfg(test)]
#[path = "verification_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preflight sub-agent: five static checks over a `Plan` before execution
//! begins (spec §4.4 Preflight, §9 Open Question #3).

use oj_core::{AgentId, Plan, ValidationIssue, ValidationResult};
use oj_coordinator::Coordinator;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Vague-language words that make an approach step untrustworthy (fixed
/// list, spec §4.4 check (e); no canonical list is given so this one is
/// the Open Question decision recorded in DESIGN.md).
const VAGUE_WORDS: &[&str] = &[
    "somehow", "etc", "maybe", "figure out", "handle appropriately", "some kind of", "and so on",
];

pub struct Preflight {
    coordinator: Coordinator,
}

impl Preflight {
    pub fn new(coordinator: Coordinator) -> Self {
        Self { coordinator }
    }

    /// Runs all five checks and stores the result in coordinator context
    /// under `preflight_result`.
    pub fn check(&self, root: &Path, plan: &Plan, agent: &AgentId) -> ValidationResult {
        let mut result = ValidationResult::default();

        let mut referenced: BTreeSet<PathBuf> = plan.relevant_files.clone();
        referenced.extend(pattern_referenced_paths(&plan.existing_patterns));

        for path in &referenced {
            if root.join(path).is_file() {
                result.existing_files.insert(path.clone());
            } else {
                result.missing_files.insert(path.clone());
            }
        }

        for dir in &plan.relevant_directories {
            let full = root.join(dir);
            if !full.is_dir() {
                result.warnings.push(
                    ValidationIssue::new("missing_directory", format!("directory does not exist: {}", dir.display()))
                        .with_file(dir.clone()),
                );
            }
        }

        // Escalation (spec §9 Open Question #3): integer division, exactly
        // half missing does NOT escalate.
        let missing = result.missing_files.len();
        let total = referenced.len();
        if total >= 3 && missing > total / 2 {
            result.errors.push(ValidationIssue::new(
                "too_many_missing_files",
                format!("{missing} of {total} referenced files are missing"),
            ));
        } else {
            for path in &result.missing_files {
                result.warnings.push(
                    ValidationIssue::new("missing_file", format!("referenced file does not exist: {}", path.display()))
                        .with_file(path.clone()),
                );
            }
        }

        for path in &plan.relevant_files {
            if self.coordinator.is_locked_by_other(path, agent) {
                result.errors.push(
                    ValidationIssue::new("file_locked", format!("file is locked by another agent: {}", path.display()))
                        .with_file(path.clone()),
                );
            }
        }

        check_approach(plan, &mut result);

        self.coordinator.set_context(
            "preflight_result",
            serde_json::to_value(&result).unwrap_or(serde_json::Value::Null),
        );
        result
    }
}

fn pattern_referenced_paths(patterns: &[String]) -> Vec<PathBuf> {
    patterns
        .iter()
        .filter(|p| p.contains('/') || p.contains('.'))
        .map(PathBuf::from)
        .collect()
}

fn check_approach(plan: &Plan, result: &mut ValidationResult) {
    if plan.approach.is_empty() {
        result.errors.push(ValidationIssue::new("empty_approach", "plan has no approach steps"));
        return;
    }

    for step in &plan.approach {
        let lowered = step.to_lowercase();
        for word in VAGUE_WORDS {
            if lowered.contains(word) {
                result
                    .warnings
                    .push(ValidationIssue::new("vague_language", format!("step uses vague language '{word}': {step}")));
            }
        }
    }

    let creates: Vec<&String> = plan.approach.iter().filter(|s| s.to_lowercase().contains("create")).collect();
    let deletes: Vec<&String> = plan.approach.iter().filter(|s| s.to_lowercase().contains("delete")).collect();
    for create_step in &creates {
        for delete_step in &deletes {
            if let Some(token) = shared_token(create_step, delete_step) {
                result.suggestions.push(format!(
                    "steps both reference '{token}': create step \"{create_step}\" and delete step \"{delete_step}\""
                ));
            }
        }
    }
}

/// The first word of length > 3 shared between two steps, used as a coarse
/// signal that a create and a delete step are fighting over the same file.
fn shared_token(a: &str, b: &str) -> Option<String> {
    let a_tokens: BTreeSet<String> = a.split_whitespace().map(|w| w.to_lowercase()).filter(|w| w.len() > 3).collect();
    b.split_whitespace()
        .map(|w| w.to_lowercase())
        .find(|w| w.len() > 3 && a_tokens.contains(w))
}

#[cfg(test)]
#[path = "preflight_tests.rs"]
mod tests;

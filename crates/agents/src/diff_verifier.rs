// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DiffVerifier sub-agent (spec §4.4 DiffVerifier): a pure heuristic, no
//! model call. Classifies each prior review issue against the before/after
//! diff by keyword overlap, and flags newly introduced "bad pattern" smells.

use crate::diff::{parse_files, FileDiff};
use oj_core::{Issue, IssueClassification, IssueVerdict, ReviewResult, VerificationResult};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Substrings that should never survive a refactor. No canonical list is
/// given upstream; this one covers the cases the reviewer is most likely to
/// flag as newly introduced.
const BAD_PATTERNS: &[&str] = &["TODO:", "FIXME:", "unwrap()", "panic!("];

const STOPWORDS: &[&str] = &["the", "this", "that", "with", "from", "into", "have", "does", "should", "which"];

pub struct DiffVerifier;

impl Default for DiffVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffVerifier {
    pub fn new() -> Self {
        Self
    }

    /// `pre_diff` is the diff the reviewer saw; `post_diff` is the diff
    /// produced by the refactor that responded to it.
    pub fn verify(&self, review: &ReviewResult, pre_diff: &str, post_diff: &str) -> VerificationResult {
        let pre = parse_files(pre_diff);
        let post = parse_files(post_diff);

        let verdicts = review
            .issues
            .iter()
            .enumerate()
            .map(|(issue_index, issue)| IssueVerdict {
                issue_index,
                classification: classify_issue(issue, &pre, &post),
            })
            .collect();

        let smells = newly_introduced_smells(&pre, &post);
        VerificationResult::from_verdicts(verdicts, smells)
    }
}

fn classify_issue(issue: &Issue, pre: &BTreeMap<PathBuf, FileDiff>, post: &BTreeMap<PathBuf, FileDiff>) -> IssueClassification {
    let keywords = extract_keywords(&issue.description);
    if keywords.is_empty() {
        return IssueClassification::Addressed;
    }
    let in_pre = any_keyword_in_added(&keywords, pre, issue.file.as_ref());
    let in_post = any_keyword_in_added(&keywords, post, issue.file.as_ref());
    match (in_pre, in_post) {
        (true, false) => IssueClassification::Addressed,
        (true, true) => IssueClassification::Unaddressed,
        (false, true) => IssueClassification::NewlyIntroduced,
        (false, false) => IssueClassification::Addressed,
    }
}

fn any_keyword_in_added(keywords: &[String], files: &BTreeMap<PathBuf, FileDiff>, scope: Option<&PathBuf>) -> bool {
    let lines: Vec<&String> = match scope {
        Some(path) => files.get(path).map(|fd| fd.added.iter().collect()).unwrap_or_default(),
        None => files.values().flat_map(|fd| fd.added.iter()).collect(),
    };
    keywords.iter().any(|k| lines.iter().any(|line| line.to_lowercase().contains(k)))
}

/// Lowercased words longer than three characters, minus a small stopword
/// list, from the issue description. No canonical keyword extractor is
/// specified; word-length-plus-stopword filtering is the deliberately
/// simple heuristic used here.
fn extract_keywords(description: &str) -> Vec<String> {
    description
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(|w| w.to_lowercase())
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

fn newly_introduced_smells(pre: &BTreeMap<PathBuf, FileDiff>, post: &BTreeMap<PathBuf, FileDiff>) -> Vec<String> {
    let mut smells = Vec::new();
    for (path, post_diff) in post {
        for pattern in BAD_PATTERNS {
            let in_post = post_diff.added.iter().any(|l| l.contains(pattern));
            let in_pre = pre.get(path).is_some_and(|fd| fd.added.iter().any(|l| l.contains(pattern)));
            if in_post && !in_pre {
                smells.push(format!("{pattern} introduced in {}", path.display()));
            }
        }
    }
    smells
}

#[cfg(test)]
#[path = "diff_verifier_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal unified-diff parsing shared by the Executor and DiffVerifier
//! sub-agents: which files changed, and which lines were added/removed.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Per-file added/removed line bodies (hunk markers and file headers
/// stripped) from a unified diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// The set of files touched by a `git diff`-style unified diff, read from
/// its `diff --git a/<path> b/<path>` headers.
pub fn changed_files(diff: &str) -> BTreeSet<PathBuf> {
    diff.lines().filter_map(header_path).collect()
}

/// Parses a unified diff into per-file added/removed line content.
pub fn parse_files(diff: &str) -> BTreeMap<PathBuf, FileDiff> {
    let mut files: BTreeMap<PathBuf, FileDiff> = BTreeMap::new();
    let mut current: Option<PathBuf> = None;

    for line in diff.lines() {
        if let Some(path) = header_path(line) {
            current = Some(path.clone());
            files.entry(path).or_default();
            continue;
        }
        let Some(path) = current.clone() else { continue };
        if line.starts_with("+++") || line.starts_with("---") || line.starts_with("@@") {
            continue;
        }
        if let Some(body) = line.strip_prefix('+') {
            files.entry(path).or_default().added.push(body.to_string());
        } else if let Some(body) = line.strip_prefix('-') {
            files.entry(path).or_default().removed.push(body.to_string());
        }
    }
    files
}

fn header_path(line: &str) -> Option<PathBuf> {
    let rest = line.strip_prefix("diff --git a/")?;
    let (_, b_side) = rest.split_once(" b/")?;
    Some(PathBuf::from(b_side.trim()))
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;

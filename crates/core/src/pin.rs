// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pin: a checksum-guarded snapshot over a closed set of related files.
//!
//! The data shape lives here; the scan/lock/verify behavior (C2
//! ContextPinner) lives in `oj-pinner`, which depends on this crate and on
//! `oj-coordinator`.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Paths below this size (bytes) have their content cached alongside the
/// checksum (spec §3 Pin, §4.2 default threshold).
pub const DEFAULT_CONTENT_CACHE_THRESHOLD: u64 = 10_000;

/// A checksum snapshot over a set of worktree-relative files, optionally
/// backed by coordinator file locks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub files: BTreeMap<PathBuf, u64>,
    /// Cached content for paths under the size threshold at pin time.
    pub content_cache: BTreeMap<PathBuf, String>,
    pub holder: AgentId,
    pub locked: bool,
}

impl Pin {
    pub fn new(holder: AgentId, locked: bool) -> Self {
        Self {
            files: BTreeMap::new(),
            content_cache: BTreeMap::new(),
            holder,
            locked,
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.keys()
    }

    pub fn checksum_of(&self, path: &PathBuf) -> Option<u64> {
        self.files.get(path).copied()
    }
}

#[cfg(test)]
#[path = "pin_tests.rs"]
mod tests;

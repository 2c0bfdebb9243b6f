// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WorkClaim: an exclusive reservation over a work-id and file set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

crate::define_id! {
    /// Globally unique work identifier.
    pub struct WorkId;
}

/// A unit of work an agent wants exclusive access to (spec §3 WorkClaim).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkClaim {
    pub work_id: WorkId,
    pub work_type: String,
    pub description: String,
    pub files: BTreeSet<PathBuf>,
}

impl WorkClaim {
    pub fn new(work_id: impl Into<WorkId>, work_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            work_id: work_id.into(),
            work_type: work_type.into(),
            description: description.into(),
            files: BTreeSet::new(),
        }
    }

    pub fn with_files(mut self, files: impl IntoIterator<Item = PathBuf>) -> Self {
        self.files.extend(files);
        self
    }
}

#[cfg(test)]
#[path = "work_tests.rs"]
mod tests;

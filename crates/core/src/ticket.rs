// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket: the immutable unit of work fetched from the tracker collaborator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

crate::define_id! {
    /// Identifier used to look a ticket up in the tracker (e.g. `"ENG-1"`).
    pub struct TicketId;
}

/// A ticket as returned by the read-only tracker lookup (spec §6.1).
///
/// Immutable once constructed: the pipeline owns one `Ticket` for the
/// duration of a run and every sub-agent observes it by shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub suggested_branch: Option<String>,
    pub labels: BTreeSet<String>,
    pub priority: String,
}

impl Ticket {
    pub fn new(id: impl Into<TicketId>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            suggested_branch: None,
            labels: BTreeSet::new(),
            priority: String::new(),
        }
    }

    pub fn with_suggested_branch(mut self, branch: impl Into<String>) -> Self {
        self.suggested_branch = Some(branch.into());
        self
    }

    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels.extend(labels);
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }
}

#[cfg(test)]
#[path = "ticket_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identity, capability, and lifecycle-state types.
//!
//! An `AgentInfo` is the coordinator's view of one sub-agent: a stable
//! identity, a name, a capability set, and a current state. It is distinct
//! from the sub-agent implementations themselves (see `oj-agents`), which
//! drive a `ModelDriver` to produce typed results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

crate::define_id! {
    /// Stable identifier for a registered agent.
    pub struct AgentId;
}

/// A capability a sub-agent may declare to the coordinator's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Plan,
    Execute,
    Review,
    Refactor,
    Test,
    Validate,
    VerifyDiff,
}

/// Current lifecycle state of an agent as tracked by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Idle,
    Working,
    Waiting,
    Complete,
    Failed,
}

impl AgentState {
    /// Terminal states are the ones `WaitFor`'s agent-transition condition matches.
    pub fn is_terminal(self) -> bool {
        matches!(self, AgentState::Complete | AgentState::Failed)
    }

    /// Non-active states are the ones the coordinator's "all agents settled"
    /// wait condition polls for.
    pub fn is_active(self) -> bool {
        matches!(self, AgentState::Working | AgentState::Waiting)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentState::Idle => "idle",
            AgentState::Working => "working",
            AgentState::Waiting => "waiting",
            AgentState::Complete => "complete",
            AgentState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// The coordinator's registry record for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub id: AgentId,
    pub name: String,
    pub capabilities: BTreeSet<Capability>,
    pub state: AgentState,
    pub priority: Option<i32>,
}

impl AgentInfo {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capabilities: BTreeSet::new(),
            state: AgentState::Idle,
            priority: None,
        }
    }

    pub fn with_capabilities(mut self, caps: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(caps);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn has_capability(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;

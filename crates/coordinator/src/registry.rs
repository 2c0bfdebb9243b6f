// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry: registration/lookup by identity and capability.
//!
//! Indexed by capability as a filter over the registry, not a dispatch
//! mechanism (spec §9 "Agent registry as a capability set").

use oj_core::{AgentId, AgentInfo, AgentState, Capability};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub(crate) struct AgentRegistry {
    agents: RwLock<HashMap<AgentId, AgentInfo>>,
}

impl AgentRegistry {
    pub(crate) fn register(&self, info: AgentInfo) {
        self.agents.write().insert(info.id.clone(), info);
    }

    pub(crate) fn get(&self, id: &AgentId) -> Option<AgentInfo> {
        self.agents.read().get(id).cloned()
    }

    /// Returns the previous state, if the agent was known.
    pub(crate) fn set_state(&self, id: &AgentId, state: AgentState) -> Option<AgentState> {
        let mut agents = self.agents.write();
        let info = agents.get_mut(id)?;
        let previous = info.state;
        info.state = state;
        Some(previous)
    }

    pub(crate) fn by_capability(&self, cap: Capability) -> Vec<AgentInfo> {
        self.agents
            .read()
            .values()
            .filter(|info| info.has_capability(cap))
            .cloned()
            .collect()
    }

    pub(crate) fn all(&self) -> Vec<AgentInfo> {
        self.agents.read().values().cloned().collect()
    }

    pub(crate) fn all_settled(&self) -> bool {
        self.agents.read().values().all(|info| !info.state.is_active())
    }

    pub(crate) fn clear(&self) {
        self.agents.write().clear();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work claims and file locks (spec §4.1 "Claim semantics").
//!
//! Claims and locks are one atomicity domain: `ClaimWork` must check both
//! the claim table and the lock table and, on success, mutate both under a
//! single critical section. They are therefore guarded by one mutex here,
//! distinct from the agent registry's and the context map's own locks —
//! "fine-grained per map" at the level of the coordinator's three
//! independent subsystems (registry, claims+locks, context), never nested
//! across them.

use oj_core::{AgentId, WorkClaim, WorkId};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

#[derive(Default)]
struct State {
    claims: HashMap<WorkId, (AgentId, BTreeSet<PathBuf>)>,
    locks: HashMap<PathBuf, AgentId>,
}

#[derive(Default)]
pub(crate) struct ClaimTable {
    state: Mutex<State>,
}

impl ClaimTable {
    /// Succeeds atomically iff the work-id is free and no file in
    /// `claim.files` is locked by a different agent.
    pub(crate) fn claim_work(&self, agent: &AgentId, claim: &WorkClaim) -> bool {
        let mut state = self.state.lock();
        if state.claims.contains_key(&claim.work_id) {
            return false;
        }
        let conflicted = claim
            .files
            .iter()
            .any(|f| matches!(state.locks.get(f), Some(holder) if holder != agent));
        if conflicted {
            return false;
        }
        for f in &claim.files {
            state.locks.insert(f.clone(), agent.clone());
        }
        state
            .claims
            .insert(claim.work_id.clone(), (agent.clone(), claim.files.clone()));
        true
    }

    /// Removes the work-id only if held by `agent`, and drops *every* file
    /// lock held by that agent — the failure-recovery path (spec §7), not
    /// just the claim's own file set.
    pub(crate) fn release_work(&self, work_id: &WorkId, agent: &AgentId) -> bool {
        let mut state = self.state.lock();
        match state.claims.get(work_id) {
            Some((holder, _)) if holder == agent => {}
            _ => return false,
        }
        state.claims.remove(work_id);
        state.locks.retain(|_, holder| holder != agent);
        true
    }

    /// Atomic across the whole set: all-or-nothing, check then acquire
    /// under the single lock. Re-locking by the same agent is a no-op.
    pub(crate) fn lock_files(&self, agent: &AgentId, files: &HashSet<PathBuf>) -> bool {
        let mut state = self.state.lock();
        let conflicted = files
            .iter()
            .any(|f| matches!(state.locks.get(f), Some(holder) if holder != agent));
        if conflicted {
            return false;
        }
        for f in files {
            state.locks.insert(f.clone(), agent.clone());
        }
        true
    }

    pub(crate) fn unlock_files(&self, agent: &AgentId, files: &HashSet<PathBuf>) {
        let mut state = self.state.lock();
        for f in files {
            if state.locks.get(f) == Some(agent) {
                state.locks.remove(f);
            }
        }
    }

    /// Release every claim and lock held by `agent` (agent-failure path).
    pub(crate) fn release_all_for(&self, agent: &AgentId) {
        let mut state = self.state.lock();
        state.claims.retain(|_, (holder, _)| holder != agent);
        state.locks.retain(|_, holder| holder != agent);
    }

    pub(crate) fn is_locked_by_other(&self, path: &PathBuf, agent: &AgentId) -> bool {
        matches!(self.state.lock().locks.get(path), Some(holder) if holder != agent)
    }

    pub(crate) fn lock_holder(&self, path: &PathBuf) -> Option<AgentId> {
        self.state.lock().locks.get(path).cloned()
    }

    pub(crate) fn claim_holder(&self, work_id: &WorkId) -> Option<AgentId> {
        self.state.lock().claims.get(work_id).map(|(a, _)| a.clone())
    }

    pub(crate) fn clear(&self) {
        let mut state = self.state.lock();
        state.claims.clear();
        state.locks.clear();
    }
}

#[cfg(test)]
#[path = "claims_tests.rs"]
mod tests;

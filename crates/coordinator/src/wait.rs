// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WaitFor`: block until one of four condition kinds fires, times out, or
//! is cancelled (spec §4.1 "Wait").
//!
//! Three of the four kinds register a `tokio::sync::Notify` so there is no
//! polling; the fourth (`AllAgentsSettled`) polls the registry at a bounded
//! interval because there is no single key to notify on.

use oj_core::{AgentId, WorkId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Poll interval for the `AllAgentsSettled` condition (spec: "≤100ms").
pub const ALL_SETTLED_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The four condition kinds `WaitFor` understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// An agent transitioning to a terminal state ({complete, failed}).
    AgentTerminal(AgentId),
    /// A work-id releasing.
    WorkReleased(WorkId),
    /// A context key being set.
    ContextSet(String),
    /// All registered agents reaching a non-active state.
    AllAgentsSettled,
}

/// A per-key registry of `Notify` handles, so `SetContext`/state-transition
/// callers can wake every waiter on that key without the waiters polling.
pub(crate) struct NotifyMap<K> {
    map: Mutex<HashMap<K, Arc<Notify>>>,
}

impl<K> Default for NotifyMap<K> {
    fn default() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> NotifyMap<K> {
    pub(crate) fn handle(&self, key: &K) -> Arc<Notify> {
        let mut map = self.map.lock();
        map.entry(key.clone()).or_insert_with(|| Arc::new(Notify::new())).clone()
    }

    pub(crate) fn notify(&self, key: &K) {
        if let Some(n) = self.map.lock().get(key) {
            n.notify_waiters();
        }
    }

    /// Wake every registered waiter on every key (used by `Stop`).
    pub(crate) fn notify_all(&self) {
        for n in self.map.lock().values() {
            n.notify_waiters();
        }
    }

    pub(crate) fn clear(&self) {
        self.notify_all();
        self.map.lock().clear();
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;

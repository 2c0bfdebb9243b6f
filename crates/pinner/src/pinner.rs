// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ContextPinner`: a stable, checksum-guarded view over a closed set of
//! related files, optionally backed by coordinator file locks (spec §4.2).

use crate::checksum::fnv1a64;
use crate::error::PinnerError;
use crate::graph::DepGraph;
use oj_coordinator::Coordinator;
use oj_core::{AgentId, Pin, DEFAULT_CONTENT_CACHE_THRESHOLD};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Owns the dependency graph and the live pins for one worktree.
///
/// The pin itself is an advisory snapshot (spec §4.2 "Contract"): it never
/// prevents other processes from writing the files, it only detects that
/// they did. Locks, when held, only bind other coordinated agents.
pub struct ContextPinner {
    root: PathBuf,
    coordinator: Coordinator,
    graph: Mutex<DepGraph>,
    pins: Mutex<HashMap<AgentId, Pin>>,
}

impl ContextPinner {
    pub fn new(root: impl Into<PathBuf>, coordinator: Coordinator) -> Self {
        Self {
            root: root.into(),
            coordinator,
            graph: Mutex::new(DepGraph::default()),
            pins: Mutex::new(HashMap::new()),
        }
    }

    pub fn related_files(&self, seeds: &[PathBuf]) -> HashSet<PathBuf> {
        self.graph.lock().related_files(&self.root, seeds)
    }

    /// Expands `files` to their transitive closure, optionally locks the
    /// whole set through the coordinator (atomic, all-or-nothing), then
    /// snapshots a checksum (and, for small files, the content) of every
    /// readable path.
    pub fn pin(
        &self,
        agent: &AgentId,
        files: &[PathBuf],
        lock: bool,
    ) -> Result<(), PinnerError> {
        let expanded = self.related_files(files);

        if lock {
            let locked = self.coordinator.lock_files(agent, &expanded);
            if !locked {
                return Err(PinnerError::FileLockError {
                    files: expanded.into_iter().collect(),
                });
            }
        }

        let mut pin = Pin::new(agent.clone(), lock);
        for path in &expanded {
            if let Ok(content) = fs::read(self.root.join(path)) {
                pin.files.insert(path.clone(), fnv1a64(&content));
                if content.len() as u64 <= DEFAULT_CONTENT_CACHE_THRESHOLD {
                    if let Ok(text) = String::from_utf8(content) {
                        pin.content_cache.insert(path.clone(), text);
                    }
                }
            }
        }

        self.pins.lock().insert(agent.clone(), pin);
        Ok(())
    }

    /// Rereads every pinned path and reports which, if any, have changed
    /// since the pin (or last refresh).
    pub fn verify_pin(&self, agent: &AgentId) -> Result<(bool, Vec<PathBuf>), PinnerError> {
        let pins = self.pins.lock();
        let pin = pins
            .get(agent)
            .ok_or_else(|| PinnerError::NoSuchPin(agent.as_str().to_string()))?;
        let mut changed = Vec::new();
        for (path, checksum) in &pin.files {
            let current = fs::read(self.root.join(path)).ok().map(|c| fnv1a64(&c));
            if current != Some(*checksum) {
                changed.push(path.clone());
            }
        }
        Ok((changed.is_empty(), changed))
    }

    /// Recomputes checksums (and caches) in place. Does not release locks
    /// and does not change the pinned file set.
    pub fn refresh_pin(&self, agent: &AgentId) -> Result<(), PinnerError> {
        let mut pins = self.pins.lock();
        let pin = pins
            .get_mut(agent)
            .ok_or_else(|| PinnerError::NoSuchPin(agent.as_str().to_string()))?;
        let paths: Vec<PathBuf> = pin.files.keys().cloned().collect();
        for path in paths {
            match fs::read(self.root.join(&path)) {
                Ok(content) => {
                    pin.files.insert(path.clone(), fnv1a64(&content));
                    if content.len() as u64 <= DEFAULT_CONTENT_CACHE_THRESHOLD {
                        if let Ok(text) = String::from_utf8(content) {
                            pin.content_cache.insert(path, text);
                        }
                    } else {
                        pin.content_cache.remove(&path);
                    }
                }
                Err(_) => {
                    pin.content_cache.remove(&path);
                }
            }
        }
        Ok(())
    }

    /// Deletes the pin and, if it was locked, releases the file locks.
    pub fn unpin(&self, agent: &AgentId) -> Result<(), PinnerError> {
        let pin = self
            .pins
            .lock()
            .remove(agent)
            .ok_or_else(|| PinnerError::NoSuchPin(agent.as_str().to_string()))?;
        if pin.locked {
            let files: HashSet<PathBuf> = pin.files.keys().cloned().collect();
            self.coordinator.unlock_files(agent, &files);
        }
        Ok(())
    }

    pub fn pin_for(&self, agent: &AgentId) -> Option<Pin> {
        self.pins.lock().get(agent).cloned()
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
#[path = "pinner_tests.rs"]
mod tests;

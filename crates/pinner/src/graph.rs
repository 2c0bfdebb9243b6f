// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dependency graph: two directed adjacency maps, scanned lazily, with
//! BFS transitive closure (spec §4.2 "Graph", §9 "Dependency graph with
//! cycles" — cyclic import graphs are expected, so closure uses a visited
//! set rather than assuming a DAG).

use crate::scan::discover_references;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Default)]
pub(crate) struct DepGraph {
    deps: HashMap<PathBuf, HashSet<PathBuf>>,
    dependents: HashMap<PathBuf, HashSet<PathBuf>>,
    scanned: HashSet<PathBuf>,
}

impl DepGraph {
    /// Scans `file` for import-like references exactly once; a file that
    /// cannot be read is treated as having no references rather than
    /// failing the whole graph (scanning is a heuristic, not a hard
    /// dependency of pinning).
    fn ensure_scanned(&mut self, root: &Path, file: &Path) {
        if self.scanned.contains(file) {
            return;
        }
        self.scanned.insert(file.to_path_buf());
        let text = match fs::read_to_string(root.join(file)) {
            Ok(text) => text,
            Err(err) => {
                debug!(file = %file.display(), %err, "could not read file for dependency scan");
                return;
            }
        };
        for referenced in discover_references(root, file, &text) {
            self.deps
                .entry(file.to_path_buf())
                .or_default()
                .insert(referenced.clone());
            self.dependents
                .entry(referenced)
                .or_default()
                .insert(file.to_path_buf());
        }
    }

    /// BFS transitive closure over the union of both edge directions,
    /// starting from `seeds`. Scans files lazily as the frontier reaches
    /// them. Always includes the seeds themselves.
    pub(crate) fn related_files(&mut self, root: &Path, seeds: &[PathBuf]) -> HashSet<PathBuf> {
        let mut seen: HashSet<PathBuf> = seeds.iter().cloned().collect();
        let mut queue: VecDeque<PathBuf> = seeds.iter().cloned().collect();

        while let Some(current) = queue.pop_front() {
            self.ensure_scanned(root, &current);
            let mut neighbors: HashSet<PathBuf> = HashSet::new();
            if let Some(d) = self.deps.get(&current) {
                neighbors.extend(d.iter().cloned());
            }
            if let Some(d) = self.dependents.get(&current) {
                neighbors.extend(d.iter().cloned());
            }
            for neighbor in neighbors {
                if seen.insert(neighbor.clone()) {
                    queue.push_back(neighbor);
                }
            }
        }

        seen
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;

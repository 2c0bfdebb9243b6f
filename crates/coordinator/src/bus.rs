// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-subscriber delivery for the message bus (spec §4.1 "Message bus").
//!
//! Delivery is best-effort: a full subscriber channel drops the message and
//! increments a counter rather than blocking the producer.

use oj_core::{AgentId, Message};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

#[derive(Default)]
pub(crate) struct SubscriberTable {
    subs: RwLock<HashMap<AgentId, mpsc::Sender<Message>>>,
    dropped: AtomicU64,
}

impl SubscriberTable {
    pub(crate) fn register(&self, id: AgentId, capacity: usize) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.subs.write().insert(id, tx);
        rx
    }

    pub(crate) fn unregister(&self, id: &AgentId) {
        self.subs.write().remove(id);
    }

    /// Forward to one target. Drops and counts on a full or missing channel.
    pub(crate) fn forward_to(&self, target: &AgentId, msg: Message) {
        let tx = self.subs.read().get(target).cloned();
        match tx {
            Some(tx) => {
                if tx.try_send(msg).is_err() {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
            None => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Forward to every registered agent except `sender`.
    pub(crate) fn broadcast_except(&self, sender: &AgentId, msg: Message) {
        let targets: Vec<(AgentId, mpsc::Sender<Message>)> = self
            .subs
            .read()
            .iter()
            .filter(|(id, _)| *id != sender)
            .map(|(id, tx)| (id.clone(), tx.clone()))
            .collect();
        for (_, tx) in targets {
            if tx.try_send(msg.clone()).is_err() {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn clear(&self) {
        self.subs.write().clear();
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Coordinator`: ties the registry, claim table, context map, wait
//! primitive, and message bus into the single shared object sub-agents talk
//! to (spec §4.1).

use crate::bus::SubscriberTable;
use crate::claims::ClaimTable;
use crate::context::ContextMap;
use crate::error::CoordinatorError;
use crate::registry::AgentRegistry;
use crate::wait::{NotifyMap, WaitCondition, ALL_SETTLED_POLL_INTERVAL};
use oj_core::{AgentId, AgentInfo, AgentState, Message, MessageType, WorkClaim, WorkId};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Tunables for the message bus (spec §4.1 "Message bus").
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorConfig {
    pub message_buffer_size: usize,
    pub subscriber_buffer_size: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            message_buffer_size: 1000,
            subscriber_buffer_size: 100,
        }
    }
}

#[derive(Deserialize)]
struct ContextUpdatePayload {
    key: String,
    value: Value,
}

struct Inner {
    config: CoordinatorConfig,
    registry: AgentRegistry,
    claims: ClaimTable,
    context: ContextMap,
    subscribers: SubscriberTable,
    agent_terminal: NotifyMap<AgentId>,
    work_released: NotifyMap<WorkId>,
    context_set: NotifyMap<String>,
    main_tx: mpsc::Sender<Message>,
    main_rx: Mutex<Option<mpsc::Receiver<Message>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    cancel: Mutex<CancellationToken>,
    running: AtomicBool,
    main_dropped: AtomicU64,
}

/// The orchestrator's shared coordination object (spec §4.1 C1).
///
/// Cheap to clone: all state lives behind `Arc`.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        let (main_tx, main_rx) = mpsc::channel(config.message_buffer_size.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                registry: AgentRegistry::default(),
                claims: ClaimTable::default(),
                context: ContextMap::default(),
                subscribers: SubscriberTable::default(),
                agent_terminal: NotifyMap::default(),
                work_released: NotifyMap::default(),
                context_set: NotifyMap::default(),
                main_tx,
                main_rx: Mutex::new(Some(main_rx)),
                dispatcher: Mutex::new(None),
                cancel: Mutex::new(CancellationToken::new()),
                running: AtomicBool::new(false),
                main_dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Starts the dispatcher task. Idempotent: a second `start` while
    /// already running is a no-op.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let rx = self.inner.main_rx.lock().take();
        let Some(mut rx) = rx else {
            // A prior Stop consumed the receiver without recreating the
            // channel; nothing left to dispatch from.
            return;
        };
        let inner = Arc::clone(&self.inner);
        let cancel = inner.cancel.lock().clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    msg = rx.recv() => {
                        match msg {
                            Some(msg) => dispatch(&inner, msg),
                            None => break,
                        }
                    }
                }
            }
        });
        *self.inner.dispatcher.lock() = Some(handle);
    }

    /// Stops the dispatcher, wakes every blocked waiter, and clears all
    /// state. Idempotent.
    pub fn stop(&self) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.inner.cancel.lock().cancel();
        if let Some(handle) = self.inner.dispatcher.lock().take() {
            handle.abort();
        }
        self.inner.agent_terminal.notify_all();
        self.inner.work_released.notify_all();
        self.inner.context_set.notify_all();
        let dropped = self.dropped_messages();
        if dropped > 0 {
            debug!(dropped, "coordinator stopping with dropped messages");
        }
        self.inner.registry.clear();
        self.inner.claims.clear();
        self.inner.context.clear();
        self.inner.subscribers.clear();
        self.inner.agent_terminal.clear();
        self.inner.work_released.clear();
        self.inner.context_set.clear();
        *self.inner.cancel.lock() = CancellationToken::new();
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    fn require_running(&self) -> Result<(), CoordinatorError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(CoordinatorError::NotRunning)
        }
    }

    // --- registry ---

    pub fn register_agent(&self, info: AgentInfo) {
        self.inner.registry.register(info);
    }

    pub fn agent(&self, id: &AgentId) -> Option<AgentInfo> {
        self.inner.registry.get(id)
    }

    pub fn set_agent_state(&self, id: &AgentId, state: AgentState) {
        if let Some(previous) = self.inner.registry.set_state(id, state) {
            if state.is_terminal() && previous != state {
                self.inner.agent_terminal.notify(id);
            }
        }
    }

    pub fn agents(&self) -> Vec<AgentInfo> {
        self.inner.registry.all()
    }

    // --- claims ---

    pub fn claim_work(&self, agent: &AgentId, claim: &WorkClaim) -> bool {
        self.inner.claims.claim_work(agent, claim)
    }

    pub fn release_work(&self, work_id: &WorkId, agent: &AgentId) -> bool {
        let released = self.inner.claims.release_work(work_id, agent);
        if released {
            self.inner.work_released.notify(work_id);
        }
        released
    }

    pub fn lock_files(&self, agent: &AgentId, files: &HashSet<PathBuf>) -> bool {
        self.inner.claims.lock_files(agent, files)
    }

    pub fn unlock_files(&self, agent: &AgentId, files: &HashSet<PathBuf>) {
        self.inner.claims.unlock_files(agent, files);
    }

    pub fn release_all_for(&self, agent: &AgentId) {
        self.inner.claims.release_all_for(agent);
        self.inner.agent_terminal.notify(agent);
    }

    pub fn is_locked_by_other(&self, path: &PathBuf, agent: &AgentId) -> bool {
        self.inner.claims.is_locked_by_other(path, agent)
    }

    // --- context ---

    pub fn set_context(&self, key: &str, value: Value) {
        self.inner.context.set(key, value);
        self.inner.context_set.notify(&key.to_string());
    }

    pub fn get_context(&self, key: &str) -> Option<Value> {
        self.inner.context.get(key)
    }

    // --- bus ---

    /// Enqueues `msg` for dispatch. Non-blocking: a full main channel drops
    /// the message and increments a counter rather than blocking the caller.
    pub fn send(&self, msg: Message) {
        if self.inner.main_tx.try_send(msg).is_err() {
            self.inner.main_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn subscribe(&self, id: AgentId) -> mpsc::Receiver<Message> {
        self.inner
            .subscribers
            .register(id, self.inner.config.subscriber_buffer_size)
    }

    pub fn unsubscribe(&self, id: &AgentId) {
        self.inner.subscribers.unregister(id);
    }

    pub fn dropped_messages(&self) -> u64 {
        self.inner.main_dropped.load(Ordering::Relaxed) + self.inner.subscribers.dropped()
    }

    // --- wait ---

    pub async fn wait_for(
        &self,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<(), CoordinatorError> {
        self.require_running()?;
        let cancel = self.inner.cancel.lock().clone();
        match condition {
            WaitCondition::AgentTerminal(id) => {
                let notify = self.inner.agent_terminal.handle(&id);
                let notified = notify.notified();
                if self
                    .inner
                    .registry
                    .get(&id)
                    .map(|info| info.state.is_terminal())
                    .unwrap_or(false)
                {
                    return Ok(());
                }
                race(notified, timeout, &cancel).await
            }
            WaitCondition::WorkReleased(work_id) => {
                let notify = self.inner.work_released.handle(&work_id);
                let notified = notify.notified();
                if self.inner.claims.claim_holder(&work_id).is_none() {
                    return Ok(());
                }
                race(notified, timeout, &cancel).await
            }
            WaitCondition::ContextSet(key) => {
                let notify = self.inner.context_set.handle(&key);
                let notified = notify.notified();
                if self.inner.context.get(&key).is_some() {
                    return Ok(());
                }
                race(notified, timeout, &cancel).await
            }
            WaitCondition::AllAgentsSettled => {
                let deadline = Instant::now() + timeout;
                loop {
                    if self.inner.registry.all_settled() {
                        return Ok(());
                    }
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(CoordinatorError::Timeout(timeout));
                    }
                    tokio::select! {
                        _ = tokio::time::sleep(ALL_SETTLED_POLL_INTERVAL.min(remaining)) => {}
                        _ = cancel.cancelled() => return Err(CoordinatorError::Cancelled),
                    }
                }
            }
        }
    }
}

async fn race(
    notified: tokio::sync::futures::Notified<'_>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(), CoordinatorError> {
    tokio::select! {
        _ = notified => Ok(()),
        _ = tokio::time::sleep(timeout) => Err(CoordinatorError::Timeout(timeout)),
        _ = cancel.cancelled() => Err(CoordinatorError::Cancelled),
    }
}

fn dispatch(inner: &Inner, msg: Message) {
    match &msg.message_type {
        MessageType::Claim => match serde_json::from_value::<WorkClaim>(msg.payload.clone()) {
            Ok(claim) => {
                inner.claims.claim_work(&msg.sender, &claim);
            }
            Err(err) => debug!(%err, "unparseable claim message payload, skipping"),
        },
        MessageType::Complete => {
            if let Some(previous) = inner.registry.set_state(&msg.sender, AgentState::Complete) {
                if previous != AgentState::Complete {
                    inner.agent_terminal.notify(&msg.sender);
                }
            }
        }
        MessageType::Failed => {
            if let Some(previous) = inner.registry.set_state(&msg.sender, AgentState::Failed) {
                if previous != AgentState::Failed {
                    inner.agent_terminal.notify(&msg.sender);
                }
            }
        }
        MessageType::ContextUpdate => {
            match serde_json::from_value::<ContextUpdatePayload>(msg.payload.clone()) {
                Ok(update) => {
                    inner.context.set(&update.key, update.value);
                    inner.context_set.notify(&update.key);
                }
                Err(err) => debug!(%err, "unparseable context-update message payload, skipping"),
            }
        }
        MessageType::Status | MessageType::Query | MessageType::Custom(_) => match &msg.target {
            Some(target) => inner.subscribers.forward_to(target, msg.clone()),
            None => inner.subscribers.broadcast_except(&msg.sender, msg.clone()),
        },
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;

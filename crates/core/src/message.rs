// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message: the coordinator's bus payload (spec §3, §4.1 message bus).

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

crate::define_id! {
    pub struct MessageId;
}

/// Control tags the dispatcher interprets directly; anything else is
/// forwarded opaquely to the target (or broadcast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Claim,
    Complete,
    Failed,
    Status,
    ContextUpdate,
    Query,
    Custom(String),
}

/// A message on the coordinator's bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub message_type: MessageType,
    pub sender: AgentId,
    /// `None` means broadcast to every registered agent except the sender.
    pub target: Option<AgentId>,
    pub payload: serde_json::Value,
    pub timestamp_ms: u64,
}

impl Message {
    pub fn new(id: impl Into<MessageId>, message_type: MessageType, sender: AgentId) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            id: id.into(),
            message_type,
            sender,
            target: None,
            payload: serde_json::Value::Null,
            timestamp_ms,
        }
    }

    pub fn to(mut self, target: AgentId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn is_broadcast(&self) -> bool {
        self.target.is_none()
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

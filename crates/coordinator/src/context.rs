// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared key/value context with publish-subscribe notify (spec §4.1
//! "Shared context"). Values are opaque JSON; there is no expiry.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default)]
pub(crate) struct ContextMap {
    values: RwLock<HashMap<String, Value>>,
}

impl ContextMap {
    pub(crate) fn set(&self, key: &str, value: Value) {
        self.values.write().insert(key.to_string(), value);
    }

    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    pub(crate) fn clear(&self) {
        self.values.write().clear();
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

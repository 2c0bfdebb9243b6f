// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The model CLI's line-delimited JSON event protocol (spec §4.3 "Event
//! protocol").

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub total_cost_usd: f64,
}

/// The accumulated outcome of one model invocation (spec §4.3: "Both modes
/// yield the same `(resultText, usage)` pair").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOutput {
    pub text: String,
    pub usage: Option<Usage>,
}

/// Folds every line of a captured event stream into a single `ModelOutput`.
/// Unparseable lines are logged at debug and skipped, never fatal.
pub(crate) fn fold_stream<I: IntoIterator<Item = String>>(lines: I) -> ModelOutput {
    let mut acc = ModelOutput::default();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        fold_line(&mut acc, &line);
    }
    acc
}

pub(crate) fn fold_line(acc: &mut ModelOutput, line: &str) {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => {
            debug!(%err, line, "unparseable model event line, skipping");
            return;
        }
    };
    let Some(event_type) = value.get("type").and_then(Value::as_str) else {
        return;
    };
    match event_type {
        "content_block_delta" => {
            if let Some(text) = value.pointer("/delta/text").and_then(Value::as_str) {
                acc.text.push_str(text);
            }
        }
        "result" => {
            if let Some(text) = extract_result_text(&value) {
                acc.text = text;
            }
            if let Some(usage) = extract_usage(&value) {
                acc.usage = Some(usage);
            }
        }
        "message_stop" => {}
        _ => {}
    }
}

fn extract_result_text(value: &Value) -> Option<String> {
    if let Some(text) = value.get("result").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    let content = value.pointer("/message/content")?.as_array()?;
    let mut text = String::new();
    for item in content {
        if item.get("type").and_then(Value::as_str) == Some("text") {
            if let Some(t) = item.get("text").and_then(Value::as_str) {
                text.push_str(t);
            }
        }
    }
    Some(text)
}

fn extract_usage(value: &Value) -> Option<Usage> {
    let usage = value.get("usage").or_else(|| value.pointer("/message/usage"))?;
    Some(Usage {
        input_tokens: usage.get("input_tokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: usage.get("output_tokens").and_then(Value::as_u64).unwrap_or(0),
        cache_read_input_tokens: usage
            .get("cache_read_input_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        cache_creation_input_tokens: usage
            .get("cache_creation_input_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        total_cost_usd: usage.get("total_cost_usd").and_then(Value::as_f64).unwrap_or(0.0),
    })
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

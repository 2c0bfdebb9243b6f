// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Planner sub-agent (spec §4.4 Planner).

use crate::error::AgentError;
use oj_core::{Plan, Ticket};
use oj_model::{ModelDriver, ModelRequest};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are a planning agent. Investigate the ticket and emit a JSON plan \
inside a fenced ```json code block with fields: summary, approach, relevant_files, \
relevant_directories, existing_patterns, test_strategy, warnings.";

pub struct Planner {
    driver: Arc<ModelDriver>,
}

impl Planner {
    pub fn new(driver: Arc<ModelDriver>) -> Self {
        Self { driver }
    }

    /// Runs the model against `ticket` and parses its structured plan.
    /// Never fatal: a parse failure yields `Plan::degraded()`.
    pub async fn plan(&self, ticket: &Ticket, cancel: &CancellationToken) -> Result<Plan, AgentError> {
        let mut request = ModelRequest::new(format!(
            "Ticket {}: {}\n\n{}",
            ticket.id, ticket.title, ticket.description
        ));
        request.system_prompt = Some(SYSTEM_PROMPT.to_string());

        let output = self.driver.run(&request, cancel).await?;
        Ok(match extract_json_block(&output.text).and_then(|json| serde_json::from_str(json).ok()) {
            Some(plan) => plan,
            None => {
                debug!(ticket = %ticket.id, "planner output did not parse, degrading");
                Plan::degraded()
            }
        })
    }
}

/// Extracts the plan's JSON payload: a fenced ```json block, any fenced
/// block, or the first-`{`-to-last-`}` span, in that order of preference.
fn extract_json_block(text: &str) -> Option<&str> {
    if let Some(json) = fenced_block(text, "```json") {
        return Some(json);
    }
    if let Some(json) = fenced_block(text, "```") {
        return Some(json);
    }
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    (last > first).then(|| text[first..=last].trim())
}

fn fenced_block<'a>(text: &'a str, fence: &str) -> Option<&'a str> {
    let start = text.find(fence)? + fence.len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;

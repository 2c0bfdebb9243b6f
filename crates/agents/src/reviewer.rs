// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reviewer sub-agent (spec §4.4 Reviewer).

use crate::error::AgentError;
use oj_core::{Plan, ReviewResult, Ticket};
use oj_model::{ModelDriver, ModelRequest};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are a code review agent. Inspect the diff against the plan's intent \
and emit a JSON review inside a fenced ```json code block with fields: issues (each with severity \
one of nit, minor, major, blocker, description, file, line, suggestion), summary, guidance.";

pub struct Reviewer {
    driver: Arc<ModelDriver>,
    /// Spec §6.4 `reviewSkill`: opaque numeric carried through to the prompt.
    review_skill: i64,
}

impl Reviewer {
    pub fn new(driver: Arc<ModelDriver>, review_skill: i64) -> Self {
        Self { driver, review_skill }
    }

    /// Reviews `diff` against `plan`. A parse failure degrades to a single
    /// blocker issue rather than silently passing unreviewed code.
    pub async fn review(&self, ticket: &Ticket, plan: &Plan, diff: &str, cancel: &CancellationToken) -> Result<ReviewResult, AgentError> {
        let mut request = ModelRequest::new(render_prompt(ticket, plan, diff, self.review_skill));
        request.system_prompt = Some(SYSTEM_PROMPT.to_string());

        let output = self.driver.run(&request, cancel).await?;
        Ok(match extract_json_block(&output.text).and_then(|json| serde_json::from_str(json).ok()) {
            Some(review) => review,
            None => {
                debug!(ticket = %ticket.id, "reviewer output did not parse, degrading");
                degraded_review()
            }
        })
    }
}

fn render_prompt(ticket: &Ticket, plan: &Plan, diff: &str, review_skill: i64) -> String {
    format!(
        "Ticket {}: {}\n\nPlan summary: {}\nApproach:\n{}\n\nReview skill: {}\n\nDiff:\n{}\n",
        ticket.id,
        ticket.title,
        plan.summary,
        plan.approach.iter().map(|s| format!("- {s}")).collect::<Vec<_>>().join("\n"),
        review_skill,
        diff,
    )
}

/// An unparseable review must not silently pass: it degrades to a single
/// blocker issue so the refactor loop treats it as a failed review.
fn degraded_review() -> ReviewResult {
    use oj_core::{Issue, Severity};
    ReviewResult {
        issues: vec![Issue::new(Severity::Blocker, "reviewer output could not be parsed")],
        summary: "reviewer output did not parse".to_string(),
        guidance: "re-run the review".to_string(),
    }
}

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
#[path = "reviewer_tests.rs"]
mod tests;

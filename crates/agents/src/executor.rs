// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor sub-agent, plus its refactor variant (spec §4.4 Executor).

use crate::diff::changed_files;
use crate::error::AgentError;
use oj_core::{ExecutionResult, Plan, ReviewResult, Ticket};
use oj_model::{ModelDriver, ModelRequest, VcsClient};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const SYSTEM_PROMPT: &str = "You are an execution agent. Implement the plan's approach exactly, \
making only the changes it describes.";

const REFACTOR_SYSTEM_PROMPT: &str = "You are an execution agent performing a refactor. Address \
every issue the reviewer raised, following its guidance, without undoing unrelated work.";

pub struct Executor {
    driver: Arc<ModelDriver>,
    vcs: Arc<dyn VcsClient>,
}

impl Executor {
    pub fn new(driver: Arc<ModelDriver>, vcs: Arc<dyn VcsClient>) -> Self {
        Self { driver, vcs }
    }

    pub async fn execute(&self, ticket: &Ticket, plan: &Plan, cancel: &CancellationToken) -> Result<ExecutionResult, AgentError> {
        let mut request = ModelRequest::new(render_execute_prompt(ticket, plan));
        request.system_prompt = Some(SYSTEM_PROMPT.to_string());
        self.run_and_stage(request, cancel).await
    }

    /// Identical to `execute` except the prompt additionally carries the
    /// prior review's issues and guidance plus the current contents of the
    /// files under review.
    pub async fn refactor(
        &self,
        ticket: &Ticket,
        plan: &Plan,
        review: &ReviewResult,
        file_contents: &BTreeMap<PathBuf, String>,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, AgentError> {
        let mut request = ModelRequest::new(render_refactor_prompt(ticket, plan, review, file_contents));
        request.system_prompt = Some(REFACTOR_SYSTEM_PROMPT.to_string());
        self.run_and_stage(request, cancel).await
    }

    async fn run_and_stage(&self, request: ModelRequest, cancel: &CancellationToken) -> Result<ExecutionResult, AgentError> {
        let output = match self.driver.run(&request, cancel).await {
            Ok(output) => output,
            Err(err) => return Ok(ExecutionResult::failed(err.to_string(), String::new())),
        };

        self.vcs.stage().await?;
        let diff = self.vcs.get_diff().await?;
        let files = changed_files(&diff);
        Ok(ExecutionResult::ok(files, output.text))
    }
}

fn render_execute_prompt(ticket: &Ticket, plan: &Plan) -> String {
    format!(
        "Ticket {}: {}\n{}\n\nPlan summary: {}\nApproach:\n{}\n",
        ticket.id,
        ticket.title,
        ticket.description,
        plan.summary,
        plan.approach.iter().map(|s| format!("- {s}")).collect::<Vec<_>>().join("\n"),
    )
}

fn render_refactor_prompt(
    ticket: &Ticket,
    plan: &Plan,
    review: &ReviewResult,
    file_contents: &BTreeMap<PathBuf, String>,
) -> String {
    let issues = review
        .issues
        .iter()
        .map(|i| format!("- [{:?}] {}", i.severity, i.description))
        .collect::<Vec<_>>()
        .join("\n");
    let files = file_contents
        .iter()
        .map(|(path, content)| format!("--- {}\n{}", path.display(), content))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "{}\n\nReview issues:\n{}\n\nReview guidance: {}\n\nCurrent file contents:\n{}\n",
        render_execute_prompt(ticket, plan),
        issues,
        review.guidance,
        files,
    )
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline error type (spec §7 "Error kinds"): the fatal class only.
//! Everything non-fatal is logged in place and folded into the run's
//! `WorkResult` instead of surfacing as an error.

use oj_agents::AgentError;
use oj_model::CollaboratorError;
use oj_pinner::PinnerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch ticket: {0}")]
    Ticket(#[source] CollaboratorError),
    #[error("failed to create worktree: {0}")]
    Worktree(#[source] CollaboratorError),
    #[error("failed to pin context: {0}")]
    Pin(#[source] PinnerError),
    #[error("failed to read diff: {0}")]
    Diff(#[source] CollaboratorError),
    #[error("execute step failed: {0}")]
    Execute(#[source] AgentError),
    #[error("execution did not succeed: {0}")]
    ExecutionFailed(String),
    #[error("refactor step failed: {0}")]
    Refactor(#[source] AgentError),
    #[error("test run failed: {0}")]
    TestRun(#[source] AgentError),
    #[error("failed to stage changes: {0}")]
    Stage(#[source] CollaboratorError),
    #[error("failed to commit: {0}")]
    Commit(#[source] CollaboratorError),
    #[error("failed to push: {0}")]
    Push(#[source] CollaboratorError),
    #[error("failed to create pull request: {0}")]
    CreatePr(#[source] CollaboratorError),
    #[error("pipeline cancelled")]
    Cancelled,
}

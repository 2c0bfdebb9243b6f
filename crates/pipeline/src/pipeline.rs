// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C5 Pipeline: the fixed nine-step sequence driving one ticket to a PR or
//! an abandoned run (spec §4.5).
//!
//! Step breakdown (numbered in code comments below): 1 fetch ticket, 2
//! create worktree, 3 plan + preflight, 4 pin context, 5 execute, 6
//! parallel test run + initial review, 7 refactor loop, 8 commit/push/PR,
//! 9 finalize. Steps 3 and 6 are non-fatal on sub-agent error (spec §7);
//! everything else aborts the run.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use oj_agents::{DiffVerifier, Executor, Planner, Preflight, Reviewer};
use oj_core::{AgentId, AgentInfo, Capability, Issue, Plan, ReviewResult, Severity, Ticket, TestResult, WorkResult};
use oj_coordinator::Coordinator;
use oj_model::{PrCreator, TicketTracker, VcsClient};
use oj_pinner::ContextPinner;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Refactor-loop states (spec §4.5 "Refactor loop state machine").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefactorState {
    Init,
    Review,
    Refactor,
    ConfirmTests,
    Done,
    Abandoned,
}

pub struct Pipeline {
    coordinator: Coordinator,
    pinner: Arc<ContextPinner>,
    tracker: Arc<dyn TicketTracker>,
    vcs: Arc<dyn VcsClient>,
    pr_creator: Arc<dyn PrCreator>,
    planner: Planner,
    preflight: Preflight,
    executor: Executor,
    reviewer: Reviewer,
    diff_verifier: DiffVerifier,
    config: PipelineConfig,
    executor_agent: AgentId,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coordinator: Coordinator,
        pinner: Arc<ContextPinner>,
        tracker: Arc<dyn TicketTracker>,
        vcs: Arc<dyn VcsClient>,
        pr_creator: Arc<dyn PrCreator>,
        planner: Planner,
        preflight: Preflight,
        executor: Executor,
        reviewer: Reviewer,
        diff_verifier: DiffVerifier,
        config: PipelineConfig,
    ) -> Self {
        let executor_agent = AgentId::new("executor");
        coordinator.register_agent(
            AgentInfo::new(executor_agent.clone(), "executor")
                .with_capabilities([Capability::Execute, Capability::Refactor]),
        );
        Self {
            coordinator,
            pinner,
            tracker,
            vcs,
            pr_creator,
            planner,
            preflight,
            executor,
            reviewer,
            diff_verifier,
            config,
            executor_agent,
        }
    }

    /// Drives one ticket through the full pipeline. Never panics out of
    /// `Work` (spec §6.6): fatal errors are folded into `WorkResult`.
    pub async fn run(&self, ticket_identifier: &str, cancel: &CancellationToken) -> WorkResult {
        match self.try_run(ticket_identifier, cancel).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(error = %err, "pipeline aborted");
                WorkResult::fatal(err.to_string(), 0)
            }
        }
    }

    async fn try_run(&self, ticket_identifier: &str, cancel: &CancellationToken) -> Result<WorkResult, PipelineError> {
        // Step 1: fetch ticket. Fatal (spec §6.1).
        info!(step = 1, ticket = ticket_identifier, "fetching ticket");
        let ticket = self.tracker.get_ticket(ticket_identifier).await.map_err(PipelineError::Ticket)?;

        // Step 2: create worktree. Fatal (spec §7).
        let branch = ticket.suggested_branch.clone().unwrap_or_else(|| format!("oj/{}", ticket.id.as_str()));
        info!(step = 2, branch = %branch, base = %self.config.base_branch, "creating worktree");
        let worktree = self
            .vcs
            .create_worktree(&branch, &self.config.base_branch)
            .await
            .map_err(PipelineError::Worktree)?;

        // Step 3: plan + preflight. Non-fatal (spec §7): errors degrade.
        info!(step = 3, "planning");
        let plan = match self.planner.plan(&ticket, cancel).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!(error = %err, "planner failed, continuing with a degraded plan");
                Plan::degraded()
            }
        };
        let validation = self.preflight.check(&worktree.path, &plan, &self.executor_agent);
        if !validation.valid() {
            warn!(errors = validation.errors.len(), "preflight reported errors, continuing");
        }
        for warning in &validation.warnings {
            warn!(code = %warning.code, message = %warning.message, "preflight warning");
        }

        // Step 4: pin context over the plan's relevant files under the
        // executor identity, unlocked (spec §4.5 "Context-pin lifecycle").
        info!(step = 4, files = plan.relevant_files.len(), "pinning context");
        let relevant: Vec<PathBuf> = plan.relevant_files.iter().cloned().collect();
        self.pinner.pin(&self.executor_agent, &relevant, false).map_err(PipelineError::Pin)?;

        let result = self.run_from_execute(&ticket, &plan, &worktree.path, &worktree.branch, cancel).await;

        // Step 7 end: unpin unconditionally, regardless of outcome.
        if let Err(err) = self.pinner.unpin(&self.executor_agent) {
            warn!(error = %err, "unpin failed");
        }

        result
    }

    async fn run_from_execute(
        &self,
        ticket: &Ticket,
        plan: &Plan,
        root: &Path,
        branch: &str,
        cancel: &CancellationToken,
    ) -> Result<WorkResult, PipelineError> {
        // Step 5: execute. Fatal (spec §7).
        info!(step = 5, "executing");
        let exec = self.executor.execute(ticket, plan, cancel).await.map_err(PipelineError::Execute)?;
        if !exec.success {
            return Err(PipelineError::ExecutionFailed(exec.error.unwrap_or_default()));
        }
        let mut changed_files = exec.changed_files;

        // Step 6: parallel test run + initial review, joined at a barrier.
        // Non-fatal (spec §7): either side's error degrades, not aborts.
        info!(step = 6, "running tests and initial review in parallel");
        let diff = self.vcs.get_diff().await.map_err(PipelineError::Diff)?;
        let test_runner = oj_agents::TestRunner::new(root);
        let (test_outcome, review_outcome) = tokio::join!(
            test_runner.run_for_files(&changed_files),
            self.reviewer.review(ticket, plan, &diff, cancel),
        );
        let mut test_result = test_outcome.unwrap_or_else(|err| {
            warn!(error = %err, "test run failed, continuing with a degraded result");
            TestResult::errored(err.to_string())
        });
        let mut review_result = review_outcome.unwrap_or_else(|err| {
            warn!(error = %err, "initial review failed, continuing with a degraded result");
            ReviewResult {
                issues: vec![Issue::new(Severity::Blocker, "reviewer agent failed")],
                summary: err.to_string(),
                guidance: String::new(),
            }
        });

        // Step 7: the refactor loop.
        let (outcome, iterations, pre_diff_final) = self
            .run_refactor_loop(ticket, plan, root, &mut changed_files, &mut test_result, &mut review_result, diff, cancel)
            .await?;
        let _ = pre_diff_final;

        match outcome {
            RefactorState::Done => {
                // Step 8: commit, push, create PR. Fatal (spec §7).
                info!(step = 8, "review and tests passed, opening a pull request");
                let commit_message = format!("{}: {}", ticket.id, ticket.title);
                self.vcs.stage().await.map_err(PipelineError::Stage)?;
                self.vcs.commit(&commit_message).await.map_err(PipelineError::Commit)?;
                self.vcs.push(branch).await.map_err(PipelineError::Push)?;
                let pr_title = format!("{}: {}", ticket.id, ticket.title);
                let pr_body = format!("{}\n\n{}", plan.summary, review_result.summary);
                let pr = self
                    .pr_creator
                    .create_pr(root, &pr_title, &pr_body, &self.config.base_branch)
                    .await
                    .map_err(PipelineError::CreatePr)?;
                // Step 9: finalize.
                info!(step = 9, iterations, pr_url = %pr.url, "pipeline done");
                Ok(WorkResult::done(pr.url, iterations, test_result.passed(), test_result.coverage_percent))
            }
            RefactorState::Abandoned => {
                info!(step = 9, iterations, "pipeline abandoned after max iterations");
                Ok(WorkResult::abandoned(iterations))
            }
            _ => unreachable!("refactor loop only returns in a terminal state"),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_refactor_loop(
        &self,
        ticket: &Ticket,
        plan: &Plan,
        root: &Path,
        changed_files: &mut BTreeSet<PathBuf>,
        test_result: &mut TestResult,
        review_result: &mut ReviewResult,
        initial_diff: String,
        cancel: &CancellationToken,
    ) -> Result<(RefactorState, u32, String), PipelineError> {
        let test_runner = oj_agents::TestRunner::new(root);
        let mut iteration = 0u32;
        let mut pre_diff = initial_diff;
        let mut state = RefactorState::Init;

        loop {
            state = match state {
                RefactorState::Init => {
                    if review_result.passed() {
                        RefactorState::ConfirmTests
                    } else {
                        RefactorState::Refactor
                    }
                }
                RefactorState::Review => {
                    *review_result = self
                        .reviewer
                        .review(ticket, plan, &pre_diff, cancel)
                        .await
                        .map_err(PipelineError::Refactor)?;
                    if review_result.passed() {
                        RefactorState::ConfirmTests
                    } else {
                        RefactorState::Refactor
                    }
                }
                RefactorState::ConfirmTests => {
                    if !test_result.passed() {
                        *test_result = test_runner
                            .run_for_files(changed_files)
                            .await
                            .map_err(PipelineError::TestRun)?;
                        if !test_result.passed() {
                            review_result
                                .issues
                                .push(Issue::new(Severity::Major, format!("Tests failed: {} failures", test_result.failed_count)));
                            RefactorState::Refactor
                        } else {
                            RefactorState::Done
                        }
                    } else {
                        RefactorState::Done
                    }
                }
                RefactorState::Refactor => {
                    info!(step = 7, iteration = iteration + 1, "refactoring");
                    let paths = context_paths(plan, review_result);
                    let file_contents = read_file_contents(root, &paths);
                    let exec = self
                        .executor
                        .refactor(ticket, plan, review_result, &file_contents, cancel)
                        .await
                        .map_err(PipelineError::Refactor)?;
                    if !exec.success {
                        return Err(PipelineError::ExecutionFailed(exec.error.unwrap_or_default()));
                    }
                    *changed_files = exec.changed_files;

                    let post_diff = self.vcs.get_diff().await.map_err(PipelineError::Diff)?;
                    let verification = self.diff_verifier.verify(review_result, &pre_diff, &post_diff);
                    info!(
                        confidence = verification.confidence,
                        all_addressed = verification.all_addressed,
                        smells = verification.newly_introduced_smells.len(),
                        "diff verifier pass (informational)"
                    );
                    pre_diff = post_diff;

                    iteration += 1;
                    if iteration >= self.config.max_iterations {
                        RefactorState::Abandoned
                    } else {
                        RefactorState::Review
                    }
                }
                RefactorState::Done => return Ok((RefactorState::Done, iteration, pre_diff)),
                RefactorState::Abandoned => return Ok((RefactorState::Abandoned, iteration, pre_diff)),
            };
        }
    }
}

fn context_paths(plan: &Plan, review: &ReviewResult) -> BTreeSet<PathBuf> {
    let mut paths = plan.relevant_files.clone();
    for issue in &review.issues {
        if let Some(file) = &issue.file {
            paths.insert(file.clone());
        }
    }
    paths
}

fn read_file_contents(root: &Path, paths: &BTreeSet<PathBuf>) -> BTreeMap<PathBuf, String> {
    let mut contents = BTreeMap::new();
    for path in paths {
        if let Ok(text) = std::fs::read_to_string(root.join(path)) {
            contents.insert(path.clone(), text);
        }
    }
    contents
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

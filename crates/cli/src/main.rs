// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj` — drives a single ticket through the pipeline (spec.md §6.4, §7
//! "User-visible failure", SPEC_FULL.md "Added: CLI binary").

mod collaborators;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collaborators::{GitVcsClient, LoggingPrCreator, StaticTicketTracker};
use config::OrchestratorConfig;
use oj_agents::{DiffVerifier, Executor, Planner, Preflight, Reviewer};
use oj_coordinator::{Coordinator, CoordinatorConfig};
use oj_model::{FakeMultiplexerSession, ModelDriver, ModelDriverConfig};
use oj_pinner::ContextPinner;
use oj_pipeline::{Pipeline, PipelineConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "oj", version, about = "Autonomous coding-agent orchestrator")]
struct Cli {
    /// Path to the orchestrator config file.
    #[arg(long, default_value = "oj.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single ticket through the pipeline to a pull request or an abandoned run.
    Run {
        /// Ticket identifier (e.g. "ENG-1").
        ticket_id: String,
        /// Ticket title, used when no real ticket tracker is configured.
        #[arg(long, default_value = "")]
        title: String,
        /// Ticket description, used when no real ticket tracker is configured.
        #[arg(long, default_value = "")]
        description: String,
        /// Repository root to operate the VCS collaborator against.
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let code = match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            2
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = OrchestratorConfig::load(&cli.config).context("loading orchestrator config")?;

    match cli.command {
        Command::Run { ticket_id, title, description, repo } => run_ticket(&config, &ticket_id, &title, &description, &repo).await,
    }
}

async fn run_ticket(config: &OrchestratorConfig, ticket_id: &str, title: &str, description: &str, repo: &Path) -> Result<i32> {
    let repo_root = repo.canonicalize().context("resolving repository root")?;
    let scratch_root = repo_root.join(".oj-scratch");
    std::fs::create_dir_all(&scratch_root).context("creating scratch directory")?;

    let ticket = oj_core::Ticket::new(ticket_id, title, description);
    let tracker = Arc::new(StaticTicketTracker::new(ticket));
    let vcs = Arc::new(GitVcsClient::new(&repo_root));
    let pr_creator = Arc::new(LoggingPrCreator);

    let mut driver_config = ModelDriverConfig::default();
    driver_config.cli_binary = config.model_cli_binary.clone();
    let driver = Arc::new(ModelDriver::new(driver_config, scratch_root, Arc::new(FakeMultiplexerSession::new())));

    let planner = Planner::new(driver.clone());
    let executor = Executor::new(driver.clone(), vcs.clone());
    let reviewer = Reviewer::new(driver.clone(), config.review_skill);
    let diff_verifier = DiffVerifier::new();

    let coordinator_config = CoordinatorConfig {
        message_buffer_size: config.message_buffer_size,
        subscriber_buffer_size: config.subscriber_buffer_size,
    };
    let coordinator = Coordinator::new(coordinator_config);
    // The worktree path is not known until step 2 of the run; the pin is
    // advisory-only (spec §4.2 "never prevents other processes from
    // writing"), so the repo root is an acceptable approximation.
    let pinner = Arc::new(ContextPinner::new(&repo_root, coordinator.clone()));
    let preflight = Preflight::new(coordinator.clone());

    let mut pipeline_config = PipelineConfig::new(config.base_branch.clone());
    pipeline_config.max_iterations = config.max_iterations;
    pipeline_config.enable_tools = config.enable_tools;
    pipeline_config.review_skill = config.review_skill;

    let pipeline = Pipeline::new(
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
        pipeline_config,
    );

    println!("oj: running {ticket_id}");
    let cancel = CancellationToken::new();
    let result = pipeline.run(ticket_id, &cancel).await;

    if result.pr_created {
        println!(
            "oj: done in {} iteration(s) — {}",
            result.iterations,
            result.pr_url.as_deref().unwrap_or("(no pr url)")
        );
        return Ok(0);
    }

    // Abandoned runs always reach at least one refactor iteration; a fatal
    // error can strike before the first one (e.g. the ticket fetch itself).
    if result.iterations > 0 {
        println!(
            "oj: abandoned after {} iteration(s) — {}",
            result.iterations,
            result.message.as_deref().unwrap_or("review did not pass")
        );
        Ok(1)
    } else {
        println!("oj: failed — {}", result.message.as_deref().unwrap_or("unknown error"));
        Ok(2)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real (non-fake) collaborator implementations for the `run` subcommand:
//! a `git`-shelling `VcsClient`, a single-ticket `TicketTracker` built
//! directly from CLI arguments, and a `PrCreator` that records the PR
//! it would have opened instead of calling out to a forge API.

use async_trait::async_trait;
use oj_core::Ticket;
use oj_model::{CollaboratorError, PrCreator, PrHandle, TicketTracker, VcsClient, Worktree};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::info;

/// Shells out to `git` under a fixed repo root (spec §6.5).
pub struct GitVcsClient {
    repo_root: PathBuf,
}

impl GitVcsClient {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self { repo_root: repo_root.into() }
    }

    async fn git(&self, args: &[&str]) -> Result<String, CollaboratorError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .await?;
        if !output.status.success() {
            return Err(CollaboratorError::Failed(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VcsClient for GitVcsClient {
    async fn create_worktree(&self, branch: &str, base: &str) -> Result<Worktree, CollaboratorError> {
        let path = self.repo_root.join(".oj-worktrees").join(branch.replace('/', "-"));
        self.git(&["worktree", "add", "-b", branch, &path.to_string_lossy(), base]).await?;
        Ok(Worktree { path, branch: branch.to_string() })
    }

    async fn get_diff(&self) -> Result<String, CollaboratorError> {
        self.git(&["diff", "HEAD"]).await
    }

    async fn stage(&self) -> Result<(), CollaboratorError> {
        self.git(&["add", "-A"]).await.map(|_| ())
    }

    async fn commit(&self, message: &str) -> Result<(), CollaboratorError> {
        self.git(&["commit", "-m", message]).await.map(|_| ())
    }

    async fn push(&self, branch: &str) -> Result<(), CollaboratorError> {
        self.git(&["push", "origin", branch]).await.map(|_| ())
    }
}

/// A ticket tracker over a single ticket supplied directly on the command
/// line, for use without a real ticket-tracker API.
pub struct StaticTicketTracker {
    ticket: Ticket,
}

impl StaticTicketTracker {
    pub fn new(ticket: Ticket) -> Self {
        Self { ticket }
    }
}

#[async_trait]
impl TicketTracker for StaticTicketTracker {
    async fn get_ticket(&self, identifier: &str) -> Result<Ticket, CollaboratorError> {
        if identifier == self.ticket.id.as_str() {
            Ok(self.ticket.clone())
        } else {
            Err(CollaboratorError::NotFound(identifier.to_string()))
        }
    }
}

/// Logs the pull request it would have opened and returns a local
/// `file://` pseudo-URL, for use without a real forge API configured.
pub struct LoggingPrCreator;

#[async_trait]
impl PrCreator for LoggingPrCreator {
    async fn create_pr(&self, dir: &Path, title: &str, body: &str, base_branch: &str) -> Result<PrHandle, CollaboratorError> {
        info!(%title, %base_branch, dir = %dir.display(), "pull request ready (no forge configured)");
        let _ = body;
        Ok(PrHandle { url: format!("file://{}#pr-pending", dir.display()) })
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External collaborator interfaces (spec §6): ticket tracker, VCS wrapper,
//! PR creator. Only the trait boundary is in scope — real implementations
//! (an HTTP tracker client, a `git` shell-out, a forge API client) are
//! outside this crate's responsibility.

use crate::error::CollaboratorError;
use async_trait::async_trait;
use oj_core::Ticket;
use std::path::{Path, PathBuf};

/// Spec §6.1: a single synchronous lookup.
#[async_trait]
pub trait TicketTracker: Send + Sync {
    async fn get_ticket(&self, identifier: &str) -> Result<Ticket, CollaboratorError>;
}

/// Result of `VcsClient::create_worktree` (spec §6.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    pub path: PathBuf,
    pub branch: String,
}

/// Spec §6.5: all methods are blocking (from the caller's perspective) and
/// cancellation-honoring.
#[async_trait]
pub trait VcsClient: Send + Sync {
    async fn create_worktree(&self, branch: &str, base: &str) -> Result<Worktree, CollaboratorError>;
    async fn get_diff(&self) -> Result<String, CollaboratorError>;
    async fn stage(&self) -> Result<(), CollaboratorError>;
    async fn commit(&self, message: &str) -> Result<(), CollaboratorError>;
    async fn push(&self, branch: &str) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrHandle {
    pub url: String,
}

#[async_trait]
pub trait PrCreator: Send + Sync {
    async fn create_pr(
        &self,
        dir: &Path,
        title: &str,
        body: &str,
        base_branch: &str,
    ) -> Result<PrHandle, CollaboratorError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fakes {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// An in-memory ticket tracker seeded with fixed tickets (grounded on
    /// `oj-adapters`'s `FakeAgentAdapter` call-recording pattern).
    #[derive(Default)]
    pub struct FakeTicketTracker {
        tickets: Mutex<HashMap<String, Ticket>>,
    }

    impl FakeTicketTracker {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, ticket: Ticket) {
            self.tickets.lock().insert(ticket.id.as_str().to_string(), ticket);
        }
    }

    #[async_trait]
    impl TicketTracker for FakeTicketTracker {
        async fn get_ticket(&self, identifier: &str) -> Result<Ticket, CollaboratorError> {
            self.tickets
                .lock()
                .get(identifier)
                .cloned()
                .ok_or_else(|| CollaboratorError::NotFound(identifier.to_string()))
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum VcsCall {
        CreateWorktree { branch: String, base: String },
        GetDiff,
        Stage,
        Commit { message: String },
        Push { branch: String },
    }

    /// A no-op VCS double that records every call it received.
    pub struct FakeVcsClient {
        pub calls: Mutex<Vec<VcsCall>>,
        pub diff: String,
        pub worktree_path: PathBuf,
    }

    impl FakeVcsClient {
        pub fn new(worktree_path: impl Into<PathBuf>, diff: impl Into<String>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                diff: diff.into(),
                worktree_path: worktree_path.into(),
            }
        }
    }

    #[async_trait]
    impl VcsClient for FakeVcsClient {
        async fn create_worktree(&self, branch: &str, base: &str) -> Result<Worktree, CollaboratorError> {
            self.calls.lock().push(VcsCall::CreateWorktree {
                branch: branch.to_string(),
                base: base.to_string(),
            });
            Ok(Worktree {
                path: self.worktree_path.clone(),
                branch: branch.to_string(),
            })
        }

        async fn get_diff(&self) -> Result<String, CollaboratorError> {
            self.calls.lock().push(VcsCall::GetDiff);
            Ok(self.diff.clone())
        }

        async fn stage(&self) -> Result<(), CollaboratorError> {
            self.calls.lock().push(VcsCall::Stage);
            Ok(())
        }

        async fn commit(&self, message: &str) -> Result<(), CollaboratorError> {
            self.calls.lock().push(VcsCall::Commit { message: message.to_string() });
            Ok(())
        }

        async fn push(&self, branch: &str) -> Result<(), CollaboratorError> {
            self.calls.lock().push(VcsCall::Push { branch: branch.to_string() });
            Ok(())
        }
    }

    /// A PR creator double yielding a fixed URL and recording invocations.
    pub struct FakePrCreator {
        pub url: String,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl FakePrCreator {
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                url: url.into(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PrCreator for FakePrCreator {
        async fn create_pr(
            &self,
            _dir: &Path,
            title: &str,
            _body: &str,
            base_branch: &str,
        ) -> Result<PrHandle, CollaboratorError> {
            self.calls.lock().push((title.to_string(), base_branch.to_string()));
            Ok(PrHandle { url: self.url.clone() })
        }
    }
}

#[cfg(test)]
#[path = "collaborators_tests.rs"]
mod tests;

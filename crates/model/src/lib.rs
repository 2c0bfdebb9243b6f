// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! oj-model: C3 ModelDriver. Runs the model CLI as a subprocess, stream-
//! parses its event protocol, retries transient failures, and owns the
//! external collaborator trait boundary (spec §6).

mod collaborators;
mod driver;
mod error;
mod event;
mod multiplexer;

pub use collaborators::{PrCreator, PrHandle, TicketTracker, VcsClient, Worktree};
pub use driver::{ExecutionMode, ModelDriver, ModelDriverConfig, ModelRequest};
pub use error::{CollaboratorError, ModelError};
pub use event::{ModelOutput, Usage};
pub use multiplexer::MultiplexerSession;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use collaborators::fakes::{FakePrCreator, FakeTicketTracker, FakeVcsClient, VcsCall};
#[cfg(any(test, feature = "test-support"))]
pub use multiplexer::fakes::FakeMultiplexerSession;

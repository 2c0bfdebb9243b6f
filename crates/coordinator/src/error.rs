// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator error types (spec §4.1 "Error conditions").

use thiserror::Error;

/// `ClaimWork`/`LockFiles` contention is reported as `false`, not an error
/// (spec §4.1); this type covers the remaining failure modes.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("wait timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("wait cancelled")]
    Cancelled,
    #[error("coordinator is not running")]
    NotRunning,
}

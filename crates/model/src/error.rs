// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ModelDriver and collaborator error types (spec §4.3, §6).

use thiserror::Error;

/// Errors from the ticket tracker, VCS, PR-creator, and multiplexer-session
/// collaborators (spec §6). Kept distinct from `ModelError` because these
/// collaborators have nothing to do with the model CLI subprocess itself.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("collaborator i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("collaborator call failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to spawn model CLI: {0}")]
    Spawn(std::io::Error),
    #[error("model CLI i/o error: {0}")]
    Io(std::io::Error),
    #[error("model CLI exited non-zero: {stderr}")]
    NonZeroExit { stderr: String },
    #[error("model CLI subprocess did not expose stdio")]
    MissingStdio,
    #[error("model call cancelled")]
    Cancelled,
    #[error("model call timed out")]
    Timeout,
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("model driver {name} failed after {attempts} attempts: {source}")]
    Exhausted {
        name: String,
        attempts: u32,
        #[source]
        source: Box<ModelError>,
    },
}

impl ModelError {
    /// Spec §4.3: "An error whose text matches any of {'rate limit',
    /// 'overloaded', 'temporarily'} is retryable; everything else is
    /// permanent."
    pub fn is_retryable(&self) -> bool {
        if matches!(self, ModelError::Cancelled | ModelError::Exhausted { .. }) {
            return false;
        }
        let text = self.to_string().to_lowercase();
        ["rate limit", "overloaded", "temporarily"]
            .iter()
            .any(|needle| text.contains(needle))
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sub-agent error type (spec §4.4, §7).

use oj_model::{CollaboratorError, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("agent i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sub-agent cancelled")]
    Cancelled,
}

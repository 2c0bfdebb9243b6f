// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ContextPinner error types (spec §4.2).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PinnerError {
    /// `Pin(..., lockFlag=true)` could not acquire every file in the set;
    /// no lock was taken (atomicity, spec §4.2 "Pin").
    #[error("could not lock {} file(s) for pin: {files:?}", files.len())]
    FileLockError { files: Vec<PathBuf> },

    #[error("no pin held by agent {0}")]
    NoSuchPin(String),
}

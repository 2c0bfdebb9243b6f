// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The indirect/multiplexer execution mode's session boundary (spec §4.3
//! "Indirect via multiplexer"). A real implementation drives a terminal
//! multiplexer (e.g. tmux); this crate only owns the trait and its fakes.

use crate::error::CollaboratorError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Spec §4.2/§4.3 + §9 "Subprocess lifecycle": a unique scratch directory
/// per session is the caller's responsibility — collisions across
/// pipelines are a defect, not something this trait can enforce.
#[async_trait]
pub trait MultiplexerSession: Send + Sync {
    /// Launches `script_path` inside a multiplexer session.
    async fn launch(&self, script_path: &Path) -> Result<(), CollaboratorError>;

    /// Captures the current pane contents, for debug logging only.
    async fn capture_pane(&self) -> Result<String, CollaboratorError>;

    /// Polls for `sentinel_path` to appear, honoring both `hard_timeout`
    /// (spec: "a hard 60-minute completion timeout independent of
    /// context") and `cancel`.
    async fn poll_sentinel(
        &self,
        sentinel_path: &Path,
        interval: Duration,
        hard_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), CollaboratorError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fakes {
    use super::*;
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::time::Instant;
    use tokio::process::Command;

    /// Actually runs the generated runner script via `sh` rather than a
    /// real multiplexer, so the sentinel and result files it touches are
    /// genuine — tests exercise the real polling loop, not a stub.
    #[derive(Default)]
    pub struct FakeMultiplexerSession {
        pub launched: Mutex<Vec<PathBuf>>,
        pub pane_contents: Mutex<String>,
    }

    impl FakeMultiplexerSession {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl MultiplexerSession for FakeMultiplexerSession {
        async fn launch(&self, script_path: &Path) -> Result<(), CollaboratorError> {
            self.launched.lock().push(script_path.to_path_buf());
            let status = Command::new("sh")
                .arg(script_path)
                .status()
                .await
                .map_err(CollaboratorError::Io)?;
            if !status.success() {
                return Err(CollaboratorError::Failed(format!(
                    "fake multiplexer script exited with {status}"
                )));
            }
            Ok(())
        }

        async fn capture_pane(&self) -> Result<String, CollaboratorError> {
            Ok(self.pane_contents.lock().clone())
        }

        async fn poll_sentinel(
            &self,
            sentinel_path: &Path,
            interval: Duration,
            hard_timeout: Duration,
            cancel: &CancellationToken,
        ) -> Result<(), CollaboratorError> {
            let deadline = Instant::now() + hard_timeout;
            loop {
                if sentinel_path.exists() {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(CollaboratorError::Failed("sentinel poll timed out".into()));
                }
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = cancel.cancelled() => {
                        return Err(CollaboratorError::Failed("sentinel poll cancelled".into()))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "multiplexer_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C3 ModelDriver: runs the model CLI as a subprocess, stream-parses its
//! event protocol, retries transient failures, and extracts the final
//! result plus usage (spec §4.3).

use crate::error::ModelError;
use crate::event::{fold_line, fold_stream, ModelOutput};
use oj_core::retry::{do_retry, Attempt, RetryConfig, RetryError};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::multiplexer::MultiplexerSession;

/// Spec §4.3 "Indirect via multiplexer" size thresholds.
#[derive(Debug, Clone)]
pub struct ModelDriverConfig {
    pub user_prompt_threshold: usize,
    pub system_prompt_threshold: usize,
    pub hard_timeout: std::time::Duration,
    pub sentinel_poll_interval: std::time::Duration,
    pub retry: RetryConfig,
    pub cli_binary: String,
}

impl Default for ModelDriverConfig {
    fn default() -> Self {
        Self {
            user_prompt_threshold: 100_000,
            system_prompt_threshold: 50_000,
            hard_timeout: std::time::Duration::from_secs(60 * 60),
            sentinel_poll_interval: std::time::Duration::from_millis(500),
            retry: RetryConfig::cli_preset(),
            cli_binary: "model-cli".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Direct,
    Multiplexer,
}

/// Spec §6.3: the model CLI's spawn arguments.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub model: Option<String>,
    pub enable_prompt_cache: bool,
    /// Spec §6.4 `enableTools`: whether the model subprocess may invoke
    /// tool calls.
    pub enable_tools: bool,
    pub force_mode: Option<ExecutionMode>,
}

impl ModelRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            user_prompt: user_prompt.into(),
            model: None,
            enable_prompt_cache: false,
            enable_tools: false,
            force_mode: None,
        }
    }
}

/// Drives one external model CLI. Held by sub-agents behind an `Arc` so a
/// single instance (and its retry/scratch configuration) is shared across
/// a pipeline run.
pub struct ModelDriver {
    config: ModelDriverConfig,
    scratch_root: PathBuf,
    multiplexer: Arc<dyn MultiplexerSession>,
}

impl ModelDriver {
    pub fn new(config: ModelDriverConfig, scratch_root: PathBuf, multiplexer: Arc<dyn MultiplexerSession>) -> Self {
        Self { config, scratch_root, multiplexer }
    }

    fn select_mode(&self, request: &ModelRequest) -> ExecutionMode {
        if let Some(mode) = request.force_mode {
            return mode;
        }
        let system_len = request.system_prompt.as_deref().map_or(0, str::len);
        if request.user_prompt.len() > self.config.user_prompt_threshold
            || system_len > self.config.system_prompt_threshold
        {
            ExecutionMode::Multiplexer
        } else {
            ExecutionMode::Direct
        }
    }

    /// Runs `request` under the C7 retry driver with the CLI-tuned preset.
    pub async fn run(
        &self,
        request: &ModelRequest,
        cancel: &CancellationToken,
    ) -> Result<ModelOutput, ModelError> {
        let mode = self.select_mode(request);
        let name = "model-driver";
        do_retry(&self.config.retry, name, cancel, || async {
            let outcome = match mode {
                ExecutionMode::Direct => self.run_direct(request, cancel).await,
                ExecutionMode::Multiplexer => self.run_multiplexer(request, cancel).await,
            };
            match outcome {
                Ok(output) => Attempt::Ok(output),
                Err(err) if err.is_retryable() => Attempt::Retryable(err),
                Err(err) => Attempt::Permanent(err),
            }
        })
        .await
        .map_err(|err| match err {
            RetryError::Cancelled => ModelError::Cancelled,
            RetryError::Permanent(err) => err,
            RetryError::Exhausted { name, attempts, last } => ModelError::Exhausted {
                name,
                attempts,
                source: Box::new(last),
            },
        })
    }

    fn build_args(&self, request: &ModelRequest, stream_json: bool) -> Vec<String> {
        let mut args = vec![
            "--print".to_string(),
            "--output-format".to_string(),
            if stream_json { "stream-json".to_string() } else { "text".to_string() },
        ];
        if let Some(system_prompt) = &request.system_prompt {
            args.push("--system-prompt".to_string());
            args.push(system_prompt.clone());
        }
        if let Some(model) = &request.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        if request.enable_prompt_cache {
            args.push("--prompt-cache".to_string());
        }
        if request.enable_tools {
            args.push("--enable-tools".to_string());
        }
        args.push(request.user_prompt.clone());
        args
    }

    async fn run_direct(
        &self,
        request: &ModelRequest,
        cancel: &CancellationToken,
    ) -> Result<ModelOutput, ModelError> {
        let mut child = Command::new(&self.config.cli_binary)
            .args(self.build_args(request, true))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .spawn()
            .map_err(ModelError::Spawn)?;

        let stdout = child.stdout.take().ok_or(ModelError::MissingStdio)?;
        let stderr = child.stderr.take().ok_or(ModelError::MissingStdio)?;

        let mut acc = ModelOutput::default();
        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_text = String::new();
        let mut stderr_lines = BufReader::new(stderr).lines();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let _ = child.kill().await;
                    return Err(ModelError::Cancelled);
                }
                line = stdout_lines.next_line() => {
                    match line.map_err(ModelError::Io)? {
                        Some(line) => fold_line(&mut acc, &line),
                        None => break,
                    }
                }
                line = stderr_lines.next_line() => {
                    if let Ok(Some(line)) = line {
                        stderr_text.push_str(&line);
                        stderr_text.push('\n');
                    }
                }
            }
        }

        let status = tokio::select! {
            _ = cancel.cancelled() => {
                let _ = child.kill().await;
                return Err(ModelError::Cancelled);
            }
            status = child.wait() => status.map_err(ModelError::Io)?,
        };

        if !status.success() {
            return Err(ModelError::NonZeroExit { stderr: stderr_text });
        }
        Ok(acc)
    }

    async fn run_multiplexer(
        &self,
        request: &ModelRequest,
        cancel: &CancellationToken,
    ) -> Result<ModelOutput, ModelError> {
        let session_dir = self.scratch_root.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&session_dir).await.map_err(ModelError::Io)?;

        let prompt_path = session_dir.join("prompt.txt");
        let system_prompt_path = session_dir.join("system_prompt.txt");
        let script_path = session_dir.join("run.sh");
        let sentinel_path = session_dir.join("done");
        let result_path = session_dir.join("result.jsonl");

        tokio::fs::write(&prompt_path, &request.user_prompt).await.map_err(ModelError::Io)?;
        if let Some(system_prompt) = &request.system_prompt {
            tokio::fs::write(&system_prompt_path, system_prompt).await.map_err(ModelError::Io)?;
        }

        let script = self.render_runner_script(
            request,
            &prompt_path,
            &system_prompt_path,
            &result_path,
            &sentinel_path,
        );
        tokio::fs::write(&script_path, script).await.map_err(ModelError::Io)?;

        self.multiplexer.launch(&script_path).await?;
        let poll_result = self
            .multiplexer
            .poll_sentinel(
                &sentinel_path,
                self.config.sentinel_poll_interval,
                self.config.hard_timeout,
                cancel,
            )
            .await;

        if poll_result.is_err() {
            if let Ok(pane) = self.multiplexer.capture_pane().await {
                debug!(pane, "multiplexer pane contents after failed poll");
            }
            return Err(ModelError::Timeout);
        }

        let result_text = tokio::fs::read_to_string(&result_path).await.map_err(ModelError::Io)?;
        let lines = result_text.lines().map(str::to_string);
        Ok(fold_stream(lines))
    }

    fn render_runner_script(
        &self,
        request: &ModelRequest,
        prompt_path: &std::path::Path,
        system_prompt_path: &std::path::Path,
        result_path: &std::path::Path,
        sentinel_path: &std::path::Path,
    ) -> String {
        let mut command = format!(
            "{} --print --output-format stream-json",
            self.config.cli_binary
        );
        if request.system_prompt.is_some() {
            command.push_str(&format!(" --system-prompt \"$(cat {})\"", system_prompt_path.display()));
        }
        if let Some(model) = &request.model {
            command.push_str(&format!(" --model {model}"));
        }
        if request.enable_prompt_cache {
            command.push_str(" --prompt-cache");
        }
        if request.enable_tools {
            command.push_str(" --enable-tools");
        }
        command.push_str(&format!(" \"$(cat {})\"", prompt_path.display()));

        format!(
            "#!/bin/sh\nset -e\n{command} > {result} 2>&1\ntouch {sentinel}\n",
            command = command,
            result = result_path.display(),
            sentinel = sentinel_path.display(),
        )
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;

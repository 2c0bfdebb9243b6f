// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `OrchestratorConfig`: everything spec.md §6.4 names, loaded from an
//! `oj.toml` file and overlaid with environment variables.

use serde::Deserialize;
use std::path::Path;

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_max_iterations() -> u32 {
    3
}

fn default_model_cli_binary() -> String {
    "model-cli".to_string()
}

fn default_message_buffer_size() -> usize {
    1000
}

fn default_subscriber_buffer_size() -> usize {
    100
}

/// Deserializes from `oj.toml`; every field falls back to the spec default
/// when the file is absent or a key is missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default)]
    pub enable_tools: bool,
    #[serde(default)]
    pub review_skill: i64,
    #[serde(default = "default_model_cli_binary")]
    pub model_cli_binary: String,
    #[serde(default)]
    pub vcs_repo_root: Option<String>,
    #[serde(default = "default_message_buffer_size")]
    pub message_buffer_size: usize,
    #[serde(default = "default_subscriber_buffer_size")]
    pub subscriber_buffer_size: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            base_branch: default_base_branch(),
            max_iterations: default_max_iterations(),
            enable_tools: false,
            review_skill: 0,
            model_cli_binary: default_model_cli_binary(),
            vcs_repo_root: None,
            message_buffer_size: default_message_buffer_size(),
            subscriber_buffer_size: default_subscriber_buffer_size(),
        }
    }
}

impl OrchestratorConfig {
    /// Loads `path` if it exists, then overlays `OJ_*` environment variables.
    /// Missing files are not an error: defaults apply.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("OJ_BASE_BRANCH") {
            self.base_branch = value;
        }
        if let Ok(value) = std::env::var("OJ_MAX_ITERATIONS") {
            if let Ok(parsed) = value.parse() {
                self.max_iterations = parsed;
            }
        }
        if let Ok(value) = std::env::var("OJ_ENABLE_TOOLS") {
            self.enable_tools = value == "1" || value.eq_ignore_ascii_case("true");
        }
        if let Ok(value) = std::env::var("OJ_REVIEW_SKILL") {
            if let Ok(parsed) = value.parse() {
                self.review_skill = parsed;
            }
        }
        if let Ok(value) = std::env::var("OJ_MODEL_CLI_BINARY") {
            self.model_cli_binary = value;
        }
        if let Ok(value) = std::env::var("OJ_VCS_REPO_ROOT") {
            self.vcs_repo_root = Some(value);
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

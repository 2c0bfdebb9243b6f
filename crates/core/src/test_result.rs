// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TestResult: the test-runner sub-agent's output.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of running a test framework, either `RunAll` or `RunForFiles`
/// (spec §4.4 TestRunner, §6.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub framework: String,
    pub total: u32,
    pub passed_count: u32,
    pub failed_count: u32,
    pub skipped: u32,
    pub coverage_percent: f64,
    pub failed_tests: Vec<String>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    pub raw_output: String,
    /// Exit status of the underlying command, independent of parsed counts.
    pub exit_success: bool,
}

impl TestResult {
    /// `passed = (failed == 0 AND command exit status == 0)` — spec §3.
    ///
    /// A non-zero exit with zero parsed failures still fails: the parser
    /// may simply not understand the framework's output.
    pub fn passed(&self) -> bool {
        self.failed_count == 0 && self.exit_success
    }

    pub fn no_framework(raw_output: impl Into<String>) -> Self {
        Self {
            framework: "no framework".to_string(),
            total: 0,
            passed_count: 0,
            failed_count: 0,
            skipped: 0,
            coverage_percent: 0.0,
            failed_tests: Vec::new(),
            duration: Duration::ZERO,
            raw_output: raw_output.into(),
            exit_success: true,
        }
    }

    /// The test runner itself could not be invoked (spawn failure, i/o
    /// error). Distinct from `no_framework`: this always fails `passed()`.
    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            framework: "error".to_string(),
            total: 0,
            passed_count: 0,
            failed_count: 0,
            skipped: 0,
            coverage_percent: 0.0,
            failed_tests: Vec::new(),
            duration: Duration::ZERO,
            raw_output: message.into(),
            exit_success: false,
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
#[path = "test_result_tests.rs"]
mod tests;

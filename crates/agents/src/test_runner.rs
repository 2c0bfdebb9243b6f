// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TestRunner sub-agent: framework detection, command construction, and
//! output parsing (spec §4.4 TestRunner, §6.2).

use crate::error::AgentError;
use oj_core::TestResult;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    Go,
    Rspec,
    Minitest,
    Jest,
    Vitest,
    Mocha,
    Npm,
    Pytest,
}

impl Framework {
    fn label(self) -> &'static str {
        match self {
            Framework::Go => "go",
            Framework::Rspec => "rspec",
            Framework::Minitest => "minitest",
            Framework::Jest => "jest",
            Framework::Vitest => "vitest",
            Framework::Mocha => "mocha",
            Framework::Npm => "npm",
            Framework::Pytest => "pytest",
        }
    }
}

pub struct TestRunner {
    root: PathBuf,
}

impl TestRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Detection order (spec §6.2): module manifest, gem manifest, package
    /// manifest, python test config. Returns `None` for "no framework".
    pub fn detect(&self) -> Option<Framework> {
        if self.root.join("go.mod").is_file() {
            return Some(Framework::Go);
        }
        if let Ok(gemfile) = std::fs::read_to_string(self.root.join("Gemfile")) {
            return Some(if gemfile.contains("rspec") { Framework::Rspec } else { Framework::Minitest });
        }
        if let Ok(package_json) = std::fs::read_to_string(self.root.join("package.json")) {
            return Some(if package_json.contains("jest") {
                Framework::Jest
            } else if package_json.contains("vitest") {
                Framework::Vitest
            } else if package_json.contains("mocha") {
                Framework::Mocha
            } else {
                Framework::Npm
            });
        }
        for marker in ["pytest.ini", "setup.py", "pyproject.toml"] {
            if self.root.join(marker).is_file() {
                return Some(Framework::Pytest);
            }
        }
        None
    }

    pub async fn run_all(&self) -> Result<TestResult, AgentError> {
        let Some(framework) = self.detect() else {
            return Ok(TestResult::no_framework("no test framework detected"));
        };
        let (program, args) = all_tests_command(framework);
        self.run(framework, program, args).await
    }

    /// Maps each changed non-test file to its sibling test file by a
    /// framework-specific naming rule; falls back to `run_all` if the
    /// mapping yields nothing.
    pub async fn run_for_files(&self, changed_files: &BTreeSet<PathBuf>) -> Result<TestResult, AgentError> {
        let Some(framework) = self.detect() else {
            return Ok(TestResult::no_framework("no test framework detected"));
        };
        let targets = targeted_files(&self.root, framework, changed_files);
        if targets.is_empty() {
            return self.run_all().await;
        }
        let Some((program, args)) = targeted_command(framework, &targets) else {
            return self.run_all().await;
        };
        self.run(framework, program, args).await
    }

    async fn run(&self, framework: Framework, program: &str, args: Vec<String>) -> Result<TestResult, AgentError> {
        let started = Instant::now();
        let output = Command::new(program).args(&args).current_dir(&self.root).output().await?;
        let duration = started.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{stdout}{stderr}");

        let mut result = parse_output(framework, &combined);
        result.duration = duration;
        result.raw_output = combined;
        // Spec §4.4: a non-zero exit with zero parsed failures still fails.
        result.exit_success = output.status.success() || result.failed_count > 0;
        Ok(result)
    }
}

fn all_tests_command(framework: Framework) -> (&'static str, Vec<String>) {
    match framework {
        Framework::Go => ("go", vec!["test".into(), "-v".into(), "-cover".into(), "./...".into()]),
        Framework::Rspec => ("bundle", vec!["exec".into(), "rspec".into(), "--format".into(), "progress".into()]),
        Framework::Minitest => ("bundle", vec!["exec".into(), "rake".into(), "test".into()]),
        Framework::Jest => ("npx", vec!["jest".into(), "--coverage".into(), "--passWithNoTests".into()]),
        Framework::Vitest => ("npx", vec!["vitest".into(), "run".into(), "--coverage".into()]),
        Framework::Mocha => ("npx", vec!["mocha".into()]),
        Framework::Npm => ("npm", vec!["test".into(), "--".into(), "--passWithNoTests".into()]),
        Framework::Pytest => ("pytest", vec!["-v".into()]),
    }
}

fn targeted_command(framework: Framework, targets: &[PathBuf]) -> Option<(&'static str, Vec<String>)> {
    let as_strings: Vec<String> = targets.iter().map(|p| p.display().to_string()).collect();
    match framework {
        Framework::Go => {
            let pkgs: BTreeSet<String> = targets
                .iter()
                .map(|p| format!("./{}/...", p.parent().unwrap_or_else(|| Path::new(".")).display()))
                .collect();
            Some(("go", std::iter::once("test".to_string())
                .chain(["-v".to_string(), "-cover".to_string()])
                .chain(pkgs)
                .collect()))
        }
        Framework::Rspec => Some((
            "bundle",
            ["exec".to_string(), "rspec".to_string(), "--format".to_string(), "progress".to_string()]
                .into_iter()
                .chain(as_strings)
                .collect(),
        )),
        Framework::Minitest => Some(("bundle", vec!["exec".to_string(), "rake".to_string(), "test".to_string()])),
        Framework::Jest => Some(("npx", ["jest".to_string()].into_iter().chain(as_strings).collect())),
        Framework::Vitest => Some(("npx", ["vitest".to_string(), "run".to_string()].into_iter().chain(as_strings).collect())),
        Framework::Mocha => Some(("npx", ["mocha".to_string()].into_iter().chain(as_strings).collect())),
        Framework::Npm => None,
        Framework::Pytest => Some(("pytest", ["-v".to_string()].into_iter().chain(as_strings).collect())),
    }
}

/// Naming rules from spec §6.2: Go `x.go ↔ x_test.go` (same dir); RSpec
/// `app/…/x.rb ↔ spec/…/x_spec.rb`; Jest/Vitest `x.ts ↔ x.test.ts |
/// x.spec.ts | __tests__/x.ts`; pytest `x.py ↔ test_x.py | tests/test_x.py`.
/// Minitest, Mocha, and Npm have no stated rule; Mocha passes the changed
/// files through directly, the others always fall back to `run_all`.
fn targeted_files(root: &Path, framework: Framework, changed_files: &BTreeSet<PathBuf>) -> Vec<PathBuf> {
    let mut targets = Vec::new();
    for file in changed_files {
        if is_test_file(framework, file) {
            targets.push(file.clone());
            continue;
        }
        match framework {
            Framework::Go => {
                if let Some(candidate) = sibling_with_suffix(file, "_test") {
                    if root.join(&candidate).is_file() {
                        targets.push(candidate);
                    }
                }
            }
            Framework::Rspec => {
                if let Some(candidate) = rspec_spec_path(file) {
                    if root.join(&candidate).is_file() {
                        targets.push(candidate);
                    }
                }
            }
            Framework::Jest | Framework::Vitest => {
                for candidate in jest_candidates(file) {
                    if root.join(&candidate).is_file() {
                        targets.push(candidate);
                        break;
                    }
                }
            }
            Framework::Pytest => {
                for candidate in pytest_candidates(file) {
                    if root.join(&candidate).is_file() {
                        targets.push(candidate);
                        break;
                    }
                }
            }
            Framework::Mocha => targets.push(file.clone()),
            Framework::Minitest | Framework::Npm => {}
        }
    }
    targets
}

fn is_test_file(framework: Framework, file: &Path) -> bool {
    let name = file.to_string_lossy();
    match framework {
        Framework::Go => name.ends_with("_test.go"),
        Framework::Rspec => name.ends_with("_spec.rb"),
        Framework::Jest | Framework::Vitest => {
            name.contains(".test.") || name.contains(".spec.") || name.contains("__tests__")
        }
        Framework::Pytest => {
            file.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with("test_"))
        }
        Framework::Mocha | Framework::Minitest | Framework::Npm => false,
    }
}

fn sibling_with_suffix(file: &Path, suffix: &str) -> Option<PathBuf> {
    let stem = file.file_stem()?.to_str()?;
    let ext = file.extension()?.to_str()?;
    Some(file.with_file_name(format!("{stem}{suffix}.{ext}")))
}

fn rspec_spec_path(file: &Path) -> Option<PathBuf> {
    let s = file.to_str()?;
    let rest = s.strip_prefix("app/")?;
    let stem = Path::new(rest).file_stem()?.to_str()?.to_string();
    let dir = Path::new(rest).parent().unwrap_or_else(|| Path::new(""));
    Some(Path::new("spec").join(dir).join(format!("{stem}_spec.rb")))
}

fn jest_candidates(file: &Path) -> Vec<PathBuf> {
    let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else { return Vec::new() };
    let Some(ext) = file.extension().and_then(|s| s.to_str()) else { return Vec::new() };
    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    vec![
        dir.join(format!("{stem}.test.{ext}")),
        dir.join(format!("{stem}.spec.{ext}")),
        dir.join("__tests__").join(format!("{stem}.{ext}")),
    ]
}

fn pytest_candidates(file: &Path) -> Vec<PathBuf> {
    let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else { return Vec::new() };
    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    vec![dir.join(format!("test_{stem}.py")), Path::new("tests").join(format!("test_{stem}.py"))]
}

fn parse_output(framework: Framework, output: &str) -> TestResult {
    match framework {
        Framework::Go => parse_go(output),
        Framework::Rspec | Framework::Minitest => parse_rspec_minitest(framework, output),
        Framework::Jest | Framework::Vitest => parse_jest_vitest(framework, output),
        Framework::Mocha => parse_mocha(output),
        Framework::Npm => parse_npm(output),
        Framework::Pytest => parse_pytest(output),
    }
}

fn base_result(framework: Framework) -> TestResult {
    TestResult {
        framework: framework.label().to_string(),
        total: 0,
        passed_count: 0,
        failed_count: 0,
        skipped: 0,
        coverage_percent: 0.0,
        failed_tests: Vec::new(),
        duration: std::time::Duration::ZERO,
        raw_output: String::new(),
        exit_success: true,
    }
}

fn parse_go(output: &str) -> TestResult {
    let mut result = base_result(Framework::Go);
    for line in output.lines() {
        let trimmed = line.trim_start();
        if let Some(name) = trimmed.strip_prefix("--- PASS: ") {
            result.passed_count += 1;
            let _ = name;
        } else if let Some(name) = trimmed.strip_prefix("--- FAIL: ") {
            result.failed_count += 1;
            result.failed_tests.push(test_name_before_paren(name));
        } else if trimmed.starts_with("--- SKIP: ") {
            result.skipped += 1;
        } else if let Some(idx) = line.find("coverage:") {
            result.coverage_percent = extract_percent(&line[idx..]).unwrap_or(0.0);
        }
    }
    result.total = result.passed_count + result.failed_count + result.skipped;
    result
}

fn parse_rspec_minitest(framework: Framework, output: &str) -> TestResult {
    let mut result = base_result(framework);
    for line in output.lines() {
        if line.contains("examples") && line.contains("failures") {
            let numbers = extract_leading_numbers(line);
            if let Some(&total) = numbers.first() {
                result.total = total;
            }
            if let Some(&failures) = numbers.get(1) {
                result.failed_count = failures;
            }
        }
        if line.contains("runs") && line.contains("assertions") {
            let numbers = extract_leading_numbers(line);
            if let Some(&runs) = numbers.first() {
                result.total = runs;
            }
            if let Some(&failures) = numbers.get(2) {
                result.failed_count = failures;
            }
        }
    }
    result.passed_count = result.total.saturating_sub(result.failed_count);
    result
}

fn parse_jest_vitest(framework: Framework, output: &str) -> TestResult {
    let mut result = base_result(framework);
    for line in output.lines() {
        if line.trim_start().starts_with("Tests:") {
            for part in line.split(',') {
                let part = part.trim();
                if let Some(n) = leading_number(part) {
                    if part.contains("failed") {
                        result.failed_count = n;
                    } else if part.contains("passed") {
                        result.passed_count = n;
                    } else if part.contains("total") {
                        result.total = n;
                    } else if part.contains("skipped") {
                        result.skipped = n;
                    }
                }
            }
        }
        if line.contains("% Stmts") {
            result.coverage_percent = extract_percent(line).unwrap_or(0.0);
        }
    }
    if result.total == 0 {
        result.total = result.passed_count + result.failed_count + result.skipped;
    }
    result
}

fn parse_mocha(output: &str) -> TestResult {
    let mut result = base_result(Framework::Mocha);
    for line in output.lines() {
        let trimmed = line.trim();
        if let Some(n) = leading_number(trimmed) {
            if trimmed.contains("passing") {
                result.passed_count = n;
            } else if trimmed.contains("failing") {
                result.failed_count = n;
            } else if trimmed.contains("pending") {
                result.skipped = n;
            }
        }
    }
    result.total = result.passed_count + result.failed_count + result.skipped;
    result
}

fn parse_npm(output: &str) -> TestResult {
    let mut result = base_result(Framework::Npm);
    result.raw_output = output.to_string();
    result
}

fn parse_pytest(output: &str) -> TestResult {
    let mut result = base_result(Framework::Pytest);
    for line in output.lines() {
        if line.contains(" passed") || line.contains(" failed") {
            for part in line.split(',') {
                let part = part.trim();
                if let Some(n) = leading_number(part) {
                    if part.contains("passed") {
                        result.passed_count = n;
                    } else if part.contains("failed") {
                        result.failed_count = n;
                    } else if part.contains("skipped") {
                        result.skipped = n;
                    }
                }
            }
        }
    }
    result.total = result.passed_count + result.failed_count + result.skipped;
    result
}

fn leading_number(s: &str) -> Option<u32> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn extract_leading_numbers(line: &str) -> Vec<u32> {
    let mut numbers = Vec::new();
    let mut current = String::new();
    for ch in line.chars() {
        if ch.is_ascii_digit() {
            current.push(ch);
        } else if !current.is_empty() {
            if let Ok(n) = current.parse() {
                numbers.push(n);
            }
            current.clear();
        }
    }
    if !current.is_empty() {
        if let Ok(n) = current.parse() {
            numbers.push(n);
        }
    }
    numbers
}

fn extract_percent(s: &str) -> Option<f64> {
    let idx = s.find('%')?;
    let before = &s[..idx];
    let start = before.rfind(|c: char| !c.is_ascii_digit() && c != '.').map(|i| i + 1).unwrap_or(0);
    before[start..].parse().ok()
}

fn test_name_before_paren(s: &str) -> String {
    s.split_whitespace().next().unwrap_or(s).to_string()
}

#[cfg(test)]
#[path = "test_runner_tests.rs"]
mod tests;

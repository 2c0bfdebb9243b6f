// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C6 HandoffFormat: a polymorphic container that yields three
//! serializations of any inter-agent payload (spec §4.6).
//!
//! Realized as a small closed variant family rather than an open trait
//! object hierarchy — spec §9 "Polymorphic handoffs" notes that dynamic
//! dispatch is not required because every consumer either inspects `kind()`
//! or accepts a concrete variant directly. The trait still exists so the
//! pipeline can log/route handoffs uniformly.

use crate::pin::Pin;
use crate::plan::Plan;
use crate::review::ReviewResult;
use crate::test_result::TestResult;
use crate::validation::ValidationResult;
use crate::verification::VerificationResult;

/// A value that can render itself in three ways for inter-agent prompts.
///
/// Contract (spec §4.6): for every handoff `h`,
/// `h.concise().len() <= h.full().len()`; `h.for_token_budget(usize::MAX) ==
/// h.full()`; `h.for_token_budget(0)` degrades to a value no longer than
/// `h.concise()`.
pub trait Handoff {
    fn full(&self) -> String;
    fn concise(&self) -> String;
    fn kind(&self) -> &'static str;

    /// `max_tokens * 4` is the rough character budget.
    fn for_token_budget(&self, max_tokens: usize) -> String {
        let full = self.full();
        let budget_chars = max_tokens.saturating_mul(4);
        if full.len() <= budget_chars {
            return full;
        }
        let concise = self.concise();
        if concise.len() <= budget_chars {
            return concise;
        }
        truncate_chars(&concise, budget_chars)
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// One variant of the closed handoff family.
#[derive(Debug, Clone)]
pub enum HandoffPayload {
    Plan(Plan),
    Validation(ValidationResult),
    Test(TestResult),
    Review(ReviewResult),
    Verification(VerificationResult),
    PinnedContext(Pin),
}

impl Handoff for HandoffPayload {
    fn full(&self) -> String {
        match self {
            HandoffPayload::Plan(p) => plan_full(p),
            HandoffPayload::Validation(v) => validation_full(v),
            HandoffPayload::Test(t) => test_full(t),
            HandoffPayload::Review(r) => review_full(r),
            HandoffPayload::Verification(v) => verification_full(v),
            HandoffPayload::PinnedContext(p) => pin_full(p),
        }
    }

    fn concise(&self) -> String {
        match self {
            HandoffPayload::Plan(p) => format!("plan: {} ({} files)", p.summary, p.relevant_files.len()),
            HandoffPayload::Validation(v) => {
                format!("validation: {} errors, {} warnings", v.errors.len(), v.warnings.len())
            }
            HandoffPayload::Test(t) => format!(
                "tests ({}): {}/{} passed, coverage {:.0}%",
                t.framework, t.passed_count, t.total, t.coverage_percent
            ),
            HandoffPayload::Review(r) => format!(
                "review: {} ({} issues)",
                if r.passed() { "passed" } else { "failed" },
                r.issues.len()
            ),
            HandoffPayload::Verification(v) => {
                format!("verification: confidence {}, all_addressed={}", v.confidence, v.all_addressed)
            }
            HandoffPayload::PinnedContext(p) => format!("pin: {} files, locked={}", p.files.len(), p.locked),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            HandoffPayload::Plan(_) => "plan",
            HandoffPayload::Validation(_) => "validation",
            HandoffPayload::Test(_) => "test",
            HandoffPayload::Review(_) => "review",
            HandoffPayload::Verification(_) => "verification",
            HandoffPayload::PinnedContext(_) => "pinned_context",
        }
    }
}

fn plan_full(p: &Plan) -> String {
    let mut out = format!("# Plan\n\n{}\n\n## Approach\n", p.summary);
    for (i, step) in p.approach.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, step));
    }
    out.push_str("\n## Relevant files\n");
    for f in &p.relevant_files {
        out.push_str(&format!("- {}\n", f.display()));
    }
    if !p.existing_patterns.is_empty() {
        out.push_str("\n## Existing patterns\n");
        for pat in &p.existing_patterns {
            out.push_str(&format!("- {}\n", pat));
        }
    }
    out.push_str(&format!("\n## Test strategy\n{}\n", p.test_strategy));
    if !p.warnings.is_empty() {
        out.push_str("\n## Warnings\n");
        for w in &p.warnings {
            out.push_str(&format!("- {}\n", w));
        }
    }
    out
}

fn validation_full(v: &ValidationResult) -> String {
    let mut out = format!("# Validation ({})\n\n", if v.valid() { "valid" } else { "invalid" });
    for e in &v.errors {
        out.push_str(&format!("ERROR [{}] {}\n", e.code, e.message));
    }
    for w in &v.warnings {
        out.push_str(&format!("WARN [{}] {}\n", w.code, w.message));
    }
    for s in &v.suggestions {
        out.push_str(&format!("SUGGESTION: {}\n", s));
    }
    out
}

fn test_full(t: &TestResult) -> String {
    format!(
        "# Test results ({})\n\ntotal={} passed={} failed={} skipped={} coverage={:.1}%\nfailed tests: {}\n\n## Raw output\n{}",
        t.framework,
        t.total,
        t.passed_count,
        t.failed_count,
        t.skipped,
        t.coverage_percent,
        t.failed_tests.join(", "),
        t.raw_output
    )
}

fn review_full(r: &ReviewResult) -> String {
    let mut out = format!("# Review\n\n{}\n\n## Issues\n", r.summary);
    for issue in &r.issues {
        out.push_str(&format!("- [{:?}] {}", issue.severity, issue.description));
        if let Some(file) = &issue.file {
            out.push_str(&format!(" ({}", file.display()));
            if let Some(line) = issue.line {
                out.push_str(&format!(":{}", line));
            }
            out.push(')');
        }
        out.push('\n');
    }
    out.push_str(&format!("\n## Guidance\n{}\n", r.guidance));
    out
}

fn verification_full(v: &VerificationResult) -> String {
    let mut out = format!(
        "# Verification\n\nall_addressed={} confidence={}\n\n",
        v.all_addressed, v.confidence
    );
    for verdict in &v.verdicts {
        out.push_str(&format!("- issue {}: {:?}\n", verdict.issue_index, verdict.classification));
    }
    if !v.newly_introduced_smells.is_empty() {
        out.push_str("\n## Newly introduced\n");
        for smell in &v.newly_introduced_smells {
            out.push_str(&format!("- {}\n", smell));
        }
    }
    out
}

fn pin_full(p: &Pin) -> String {
    let mut out = format!("# Pinned context (locked={})\n\n", p.locked);
    for (path, checksum) in &p.files {
        out.push_str(&format!("- {} ({:016x})\n", path.display(), checksum));
    }
    out
}

#[cfg(test)]
#[path = "handoff_tests.rs"]
mod tests;

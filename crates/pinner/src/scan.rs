// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Language-indexed import extraction and relative-path resolution
//! (spec §4.2 "Dependency scan").
//!
//! Non-relative references (package/gem/module imports that do not point
//! into the worktree) are dropped silently at extraction time — spec §9
//! open question #1 preserves this behavior rather than guessing intent.

use std::path::{Component, Path, PathBuf};

const KNOWN_EXTENSIONS: &[&str] = &["go", "rb", "py", "ts", "tsx", "js", "jsx", "mjs", "cjs"];
const TS_JS_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Extracts relative import-like references from `text`, dialect chosen by
/// `file`'s extension, then resolves each to a worktree-relative path that
/// actually exists on disk.
pub(crate) fn discover_references(root: &Path, file: &Path, text: &str) -> Vec<PathBuf> {
    let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
    let (raw_refs, is_ts_js) = match ext {
        "go" => (extract_go(text), false),
        "rb" => (extract_ruby(text), false),
        "py" => (extract_python(text), false),
        "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" => (extract_ts_js(text), true),
        _ => (Vec::new(), false),
    };
    raw_refs
        .into_iter()
        .filter_map(|raw| resolve(root, file, &raw, is_ts_js))
        .collect()
}

fn is_relative(spec: &str) -> bool {
    spec.starts_with("./") || spec.starts_with("../")
}

fn quoted_any(s: &str) -> Option<String> {
    for quote in ['\'', '"'] {
        if let Some(first) = s.find(quote) {
            let rest = &s[first + 1..];
            if let Some(last) = rest.find(quote) {
                return Some(rest[..last].to_string());
            }
        }
    }
    None
}

fn extract_go(text: &str) -> Vec<String> {
    let mut refs = Vec::new();
    let mut in_block = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if !in_block && trimmed.starts_with("import (") {
            in_block = true;
            continue;
        }
        if in_block {
            if trimmed == ")" {
                in_block = false;
                continue;
            }
            if let Some(path) = quoted_any(trimmed) {
                if is_relative(&path) {
                    refs.push(path);
                }
            }
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("import ") {
            if let Some(path) = quoted_any(rest) {
                if is_relative(&path) {
                    refs.push(path);
                }
            }
        }
    }
    refs
}

fn extract_ruby(text: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("require_relative") {
            if let Some(path) = quoted_any(rest) {
                refs.push(path);
            }
        }
    }
    refs
}

/// Extracts relative `from`-imports. `from .sibling import x` resolves via
/// the dotted module path; `from . import a, b` has no module component, so
/// each imported name is treated as a sibling module file.
fn extract_python(text: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("from ") else {
            continue;
        };
        let mut halves = rest.splitn(2, " import ");
        let module = halves.next().unwrap_or("").trim();
        let names = halves.next().unwrap_or("");
        if !module.starts_with('.') {
            continue;
        }
        let dots = module.chars().take_while(|&c| c == '.').count();
        let remainder = &module[dots..];
        let ups = dots.saturating_sub(1);
        let mut base_parts: Vec<String> = (0..ups).map(|_| "..".to_string()).collect();
        if !remainder.is_empty() {
            base_parts.extend(remainder.split('.').map(str::to_string));
            refs.push(base_parts.join("/"));
        } else {
            for name in names.split(',') {
                let name = name.trim().split_whitespace().next().unwrap_or("");
                if name.is_empty() {
                    continue;
                }
                let mut full = base_parts.clone();
                full.push(name.to_string());
                refs.push(full.join("/"));
            }
        }
    }
    refs
}

fn extract_ts_js(text: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        let spec = if trimmed.starts_with("import ") || trimmed.starts_with("export ") {
            quoted_any(trimmed)
        } else if let Some(idx) = trimmed.find("require(") {
            quoted_any(&trimmed[idx + "require(".len()..])
        } else {
            None
        };
        if let Some(spec) = spec {
            if is_relative(&spec) {
                refs.push(spec);
            }
        }
    }
    refs
}

fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<std::ffi::OsString> = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str().to_os_string()),
        }
    }
    out.into_iter().collect()
}

fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let mut p = path.to_path_buf();
    p.set_extension(ext);
    p
}

/// Resolution order (spec §4.2): (i) raw as written, (ii) the current
/// file's own extension, (iii) a fixed list of known source extensions,
/// (iv) for TS/JS, `<path>/index.<ext>`. Only a candidate that exists in
/// the worktree is returned.
fn resolve(root: &Path, current_file: &Path, raw_ref: &str, is_ts_js: bool) -> Option<PathBuf> {
    let base_dir = current_file.parent().unwrap_or_else(|| Path::new(""));
    let joined = normalize(&base_dir.join(raw_ref));

    let mut candidates: Vec<PathBuf> = vec![joined.clone()];
    if let Some(ext) = current_file.extension().and_then(|e| e.to_str()) {
        candidates.push(with_extension(&joined, ext));
    }
    for ext in KNOWN_EXTENSIONS {
        candidates.push(with_extension(&joined, ext));
    }
    if is_ts_js {
        for ext in TS_JS_EXTENSIONS {
            candidates.push(joined.join(format!("index.{ext}")));
        }
    }

    candidates.into_iter().find(|c| root.join(c).is_file())
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;

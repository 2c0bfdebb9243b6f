use super::*;
use oj_core::Plan;
use oj_model::{FakeMultiplexerSession, ModelDriverConfig};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn write_executable(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn reviewer_with_cli_output(dir: &std::path::Path, result_json: &str) -> Reviewer {
    let script = format!(
        "#!/bin/sh\necho '{{\"type\":\"result\",\"result\":{}}}'\n",
        serde_json::to_string(result_json).expect("escape script output")
    );
    let cli = write_executable(dir, "cli.sh", &script);
    let mut config = ModelDriverConfig::default();
    config.cli_binary = cli.to_string_lossy().to_string();
    config.retry.max_attempts = 1;
    let scratch = tempfile::tempdir().expect("scratch").into_path();
    let driver = ModelDriver::new(config, scratch, Arc::new(FakeMultiplexerSession::new()));
    Reviewer::new(Arc::new(driver), 2)
}

fn sample_plan() -> Plan {
    Plan { summary: "add multiply".to_string(), approach: vec!["write fn multiply".to_string()], ..Plan::default() }
}

#[tokio::test]
async fn review_parses_fenced_json_with_issues() {
    let dir = tempfile::tempdir().expect("tempdir");
    let body = "```json\n{\"issues\":[{\"severity\":\"major\",\"description\":\"no error handling\",\
\"file\":null,\"line\":null,\"suggestion\":null}],\"summary\":\"needs work\",\"guidance\":\"add Result\"}\n```";
    let reviewer = reviewer_with_cli_output(dir.path(), body);
    let ticket = Ticket::new("ENG-1", "Add multiply", "desc");
    let cancel = CancellationToken::new();
    let review = reviewer.review(&ticket, &sample_plan(), "diff --git a/x b/x\n", &cancel).await.expect("review");
    assert!(!review.passed());
    assert_eq!(review.issues.len(), 1);
}

#[tokio::test]
async fn review_with_no_issues_passes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let body = "{\"issues\":[],\"summary\":\"looks good\",\"guidance\":\"\"}";
    let reviewer = reviewer_with_cli_output(dir.path(), body);
    let ticket = Ticket::new("ENG-1", "Add multiply", "desc");
    let cancel = CancellationToken::new();
    let review = reviewer.review(&ticket, &sample_plan(), "diff --git a/x b/x\n", &cancel).await.expect("review");
    assert!(review.passed());
}

#[tokio::test]
async fn review_degrades_to_blocker_on_unparseable_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reviewer = reviewer_with_cli_output(dir.path(), "no json here");
    let ticket = Ticket::new("ENG-1", "Add multiply", "desc");
    let cancel = CancellationToken::new();
    let review = reviewer.review(&ticket, &sample_plan(), "diff --git a/x b/x\n", &cancel).await.expect("review");
    assert!(!review.passed());
    assert_eq!(review.issues[0].severity, oj_core::Severity::Blocker);
}

use super::*;
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

fn planner_with_cli_output(dir: &std::path::Path, result_json: &str) -> Planner {
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
    Planner::new(Arc::new(driver))
}

#[tokio::test]
async fn plan_parses_fenced_json_block() {
    let dir = tempfile::tempdir().expect("tempdir");
    let body = "Here is the plan:\n```json\n{\"summary\":\"add multiply\",\"approach\":[\"write fn\"],\
\"relevant_files\":[\"src/math.rs\"],\"relevant_directories\":[],\"existing_patterns\":[],\
\"test_strategy\":\"unit tests\",\"warnings\":[]}\n```\ndone";
    let planner = planner_with_cli_output(dir.path(), body);
    let ticket = Ticket::new("ENG-1", "Add multiply", "desc");
    let cancel = CancellationToken::new();
    let plan = planner.plan(&ticket, &cancel).await.expect("plan");
    assert_eq!(plan.summary, "add multiply");
    assert!(!plan.is_degraded());
}

#[tokio::test]
async fn plan_falls_back_to_brace_span_without_fence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let body = "plan: {\"summary\":\"fix bug\",\"approach\":[\"patch\"],\"relevant_files\":[],\
\"relevant_directories\":[],\"existing_patterns\":[],\"test_strategy\":\"\",\"warnings\":[]} thanks";
    let planner = planner_with_cli_output(dir.path(), body);
    let ticket = Ticket::new("ENG-2", "Fix bug", "desc");
    let cancel = CancellationToken::new();
    let plan = planner.plan(&ticket, &cancel).await.expect("plan");
    assert_eq!(plan.summary, "fix bug");
}

#[tokio::test]
async fn plan_degrades_on_unparseable_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let planner = planner_with_cli_output(dir.path(), "I could not find a plan.");
    let ticket = Ticket::new("ENG-3", "Unknown", "desc");
    let cancel = CancellationToken::new();
    let plan = planner.plan(&ticket, &cancel).await.expect("plan");
    assert!(plan.is_degraded());
}

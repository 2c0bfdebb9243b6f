use super::*;
use crate::multiplexer::fakes::FakeMultiplexerSession;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn write_executable(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn driver_with_binary(binary: PathBuf) -> ModelDriver {
    let scratch = tempfile::tempdir().expect("scratch dir").into_path();
    let mut config = ModelDriverConfig::default();
    config.cli_binary = binary.to_string_lossy().to_string();
    config.retry.max_attempts = 1;
    ModelDriver::new(config, scratch, Arc::new(FakeMultiplexerSession::new()))
}

#[tokio::test]
async fn run_direct_mode_accumulates_result_text_and_usage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cli = write_executable(
        dir.path(),
        "cli.sh",
        "#!/bin/sh\necho '{\"type\":\"content_block_delta\",\"delta\":{\"text\":\"hel\"}}'\n\
         echo '{\"type\":\"result\",\"result\":\"hello\",\"usage\":{\"input_tokens\":3,\"output_tokens\":1,\
         \"cache_read_input_tokens\":0,\"cache_creation_input_tokens\":0,\"total_cost_usd\":0.01}}'\n",
    );
    let driver = driver_with_binary(cli);
    let request = ModelRequest::new("hi");
    let cancel = CancellationToken::new();
    let output = driver.run(&request, &cancel).await.expect("run");
    assert_eq!(output.text, "hello");
    assert_eq!(output.usage.expect("usage").input_tokens, 3);
}

#[tokio::test]
async fn run_direct_mode_non_zero_exit_surfaces_stderr() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cli = write_executable(dir.path(), "cli.sh", "#!/bin/sh\necho boom 1>&2\nexit 1\n");
    let driver = driver_with_binary(cli);
    let request = ModelRequest::new("hi");
    let cancel = CancellationToken::new();
    let err = driver.run(&request, &cancel).await.unwrap_err();
    match err {
        ModelError::NonZeroExit { stderr } => assert!(stderr.contains("boom")),
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
}

#[tokio::test]
async fn run_direct_mode_retries_transient_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let counter_path = dir.path().join("attempts");
    std::fs::write(&counter_path, "0").expect("seed counter");
    let script = format!(
        "#!/bin/sh\ncount=$(cat {counter})\ncount=$((count + 1))\necho $count > {counter}\n\
         if [ \"$count\" -lt 2 ]; then echo 'overloaded, please retry' 1>&2; exit 1; fi\n\
         echo '{{\"type\":\"result\",\"result\":\"ok after retry\"}}'\n",
        counter = counter_path.display(),
    );
    let cli = write_executable(dir.path(), "cli.sh", &script);
    let scratch = tempfile::tempdir().expect("scratch").into_path();
    let mut config = ModelDriverConfig::default();
    config.cli_binary = cli.to_string_lossy().to_string();
    config.retry.max_attempts = 3;
    config.retry.initial_delay = std::time::Duration::from_millis(1);
    config.retry.max_delay = std::time::Duration::from_millis(5);
    let driver = ModelDriver::new(config, scratch, Arc::new(FakeMultiplexerSession::new()));
    let request = ModelRequest::new("hi");
    let cancel = CancellationToken::new();
    let output = driver.run(&request, &cancel).await.expect("eventually succeeds");
    assert_eq!(output.text, "ok after retry");
}

#[tokio::test]
async fn run_direct_mode_permanent_error_is_not_retried() {
    let dir = tempfile::tempdir().expect("tempdir");
    let counter_path = dir.path().join("attempts");
    std::fs::write(&counter_path, "0").expect("seed counter");
    let script = format!(
        "#!/bin/sh\ncount=$(cat {counter})\ncount=$((count + 1))\necho $count > {counter}\n\
         echo bogus request 1>&2\nexit 1\n",
        counter = counter_path.display(),
    );
    let cli = write_executable(dir.path(), "cli.sh", &script);
    let scratch = tempfile::tempdir().expect("scratch").into_path();
    let mut config = ModelDriverConfig::default();
    config.cli_binary = cli.to_string_lossy().to_string();
    config.retry.max_attempts = 3;
    let driver = ModelDriver::new(config, scratch, Arc::new(FakeMultiplexerSession::new()));
    let request = ModelRequest::new("hi");
    let cancel = CancellationToken::new();
    let err = driver.run(&request, &cancel).await.unwrap_err();
    assert!(matches!(err, ModelError::NonZeroExit { .. }));
    let attempts: u32 = std::fs::read_to_string(&counter_path)
        .expect("read counter")
        .trim()
        .parse()
        .expect("parse counter");
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn select_mode_forces_multiplexer_for_oversized_user_prompt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cli = write_executable(dir.path(), "cli.sh", "#!/bin/sh\nexit 0\n");
    let driver = driver_with_binary(cli);
    let mut request = ModelRequest::new("x".repeat(200_000));
    request.force_mode = None;
    assert_eq!(driver.select_mode(&request), ExecutionMode::Multiplexer);
}

#[tokio::test]
async fn select_mode_stays_direct_for_small_prompts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cli = write_executable(dir.path(), "cli.sh", "#!/bin/sh\nexit 0\n");
    let driver = driver_with_binary(cli);
    let request = ModelRequest::new("hi");
    assert_eq!(driver.select_mode(&request), ExecutionMode::Direct);
}

#[tokio::test]
async fn run_multiplexer_mode_reads_result_file_written_by_runner_script() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cli = write_executable(
        dir.path(),
        "cli.sh",
        "#!/bin/sh\necho '{\"type\":\"result\",\"result\":\"from multiplexer\"}'\n",
    );
    let scratch = tempfile::tempdir().expect("scratch").into_path();
    let mut config = ModelDriverConfig::default();
    config.cli_binary = cli.to_string_lossy().to_string();
    config.retry.max_attempts = 1;
    config.sentinel_poll_interval = std::time::Duration::from_millis(5);
    config.hard_timeout = std::time::Duration::from_secs(5);
    let driver = ModelDriver::new(config, scratch, Arc::new(FakeMultiplexerSession::new()));

    let mut request = ModelRequest::new("hi");
    request.force_mode = Some(ExecutionMode::Multiplexer);
    let cancel = CancellationToken::new();
    let output = driver.run(&request, &cancel).await.expect("multiplexer run");
    assert_eq!(output.text, "from multiplexer");
}

#[tokio::test]
async fn run_direct_mode_kills_subprocess_on_cancellation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cli = write_executable(dir.path(), "cli.sh", "#!/bin/sh\nsleep 30\n");
    let driver = driver_with_binary(cli);
    let request = ModelRequest::new("hi");
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        cancel_clone.cancel();
    });
    let err = driver.run(&request, &cancel).await.unwrap_err();
    assert!(matches!(err, ModelError::Cancelled));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

fn no_jitter_config(max_attempts: u32, initial_delay: Duration) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay,
        max_delay: Duration::from_secs(60),
        multiplier: 2.0,
        jitter: 0.0,
    }
}

#[tokio::test]
async fn permanent_error_invokes_function_exactly_once() {
    let calls = AtomicU32::new(0);
    let cfg = no_jitter_config(3, Duration::from_millis(1));
    let cancel = CancellationToken::new();

    let result: Result<(), RetryError<String>> = do_retry(&cfg, "op", &cancel, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Attempt::Permanent("bad input".to_string()) }
    })
    .await;

    assert!(matches!(result, Err(RetryError::Permanent(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exhaustion_invokes_function_max_attempts_times_and_takes_at_least_backoff_sum() {
    let calls = AtomicU32::new(0);
    let cfg = no_jitter_config(3, Duration::from_millis(50));
    let cancel = CancellationToken::new();

    let start = Instant::now();
    let result: Result<(), RetryError<String>> = do_retry(&cfg, "op", &cancel, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Attempt::Retryable("transient".to_string()) }
    })
    .await;
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(RetryError::Exhausted { attempts: 3, .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // two waits of ~50ms and ~100ms between three attempts
    assert!(elapsed >= Duration::from_millis(150));
    assert!(elapsed < Duration::from_millis(400));
}

#[tokio::test]
async fn succeeds_after_transient_failures() {
    let calls = AtomicU32::new(0);
    let cfg = no_jitter_config(5, Duration::from_millis(1));
    let cancel = CancellationToken::new();

    let result: Result<u32, RetryError<String>> = do_retry(&cfg, "op", &cancel, || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Attempt::Retryable("not yet".to_string())
            } else {
                Attempt::Ok(n)
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn cancellation_stops_retrying_without_waiting_full_backoff() {
    let cfg = no_jitter_config(5, Duration::from_secs(5));
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel_clone.cancel();
    });

    let start = Instant::now();
    let result: Result<(), RetryError<String>> = do_retry(&cfg, "op", &cancel, || async {
        Attempt::Retryable("transient".to_string())
    })
    .await;

    assert!(matches!(result, Err(RetryError::Cancelled)));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn delay_for_attempt_respects_cap() {
    let cfg = RetryConfig {
        max_attempts: 10,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(15),
        multiplier: 1.5,
        jitter: 0.0,
    };
    // attempt 10 would be 2 * 1.5^9 ≈ 76.9s without the cap
    assert_eq!(cfg.delay_for_attempt(10), Duration::from_secs(15));
}

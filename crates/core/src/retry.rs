// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C7 Retry: a shared exponential-backoff-with-jitter driver, plus the
//! permanent/transient error distinction every other component relies on.

use rand::Rng;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Backoff configuration for one named retry policy (spec §4.7, §6.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: f64,
}

impl RetryConfig {
    /// General-purpose default preset.
    pub const fn default_preset() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }

    /// Tuned for HTTP/API collaborators: more attempts, shorter cap.
    pub const fn api_preset() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: 0.2,
        }
    }

    /// Tuned for the model CLI subprocess (spec §4.3 Retry).
    pub const fn cli_preset() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(15),
            multiplier: 1.5,
            jitter: 0.1,
        }
    }

    /// `delay_k = min(MaxDelay, InitialDelay × Multiplier^(k-1)) × (1 ± Jitter × U[-1,1])`
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32 - 1);
        let capped = base.min(self.max_delay.as_secs_f64());
        let jitter_factor = if self.jitter > 0.0 {
            let mut rng = rand::rng();
            1.0 + self.jitter * rng.random_range(-1.0..=1.0)
        } else {
            1.0
        };
        Duration::from_secs_f64((capped * jitter_factor).max(0.0))
    }
}

/// Wraps an error as non-retryable. `Retry::do_` unwraps and stops immediately.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Permanent<E>(pub E)
where
    E: fmt::Display + fmt::Debug;

/// An attempt's outcome: either retryable or permanently failed.
#[derive(Debug)]
pub enum Attempt<T, E> {
    Ok(T),
    Retryable(E),
    Permanent(E),
}

/// Errors surfaced by the retry driver itself.
#[derive(Debug, Error)]
pub enum RetryError<E: fmt::Display + fmt::Debug> {
    #[error("cancelled")]
    Cancelled,
    #[error("permanent error: {0}")]
    Permanent(E),
    #[error("{name} failed after {attempts} attempts: {last}")]
    Exhausted {
        name: String,
        attempts: u32,
        last: E,
    },
}

/// Run `f` under `cfg`'s backoff policy, honoring `cancel`.
///
/// `f` reports `Attempt::Permanent` for errors the retry driver must not
/// retry (validation, parse, wrong-handoff-type) and `Attempt::Retryable`
/// for everything else. On a retryable error whose text matches any of
/// `{"rate limit", "overloaded", "temporarily"}` callers should already
/// have classified as retryable before calling in — the matching itself is
/// the caller's concern (spec §4.3), not this driver's.
pub async fn do_retry<T, E, F, Fut>(
    cfg: &RetryConfig,
    name: &str,
    cancel: &CancellationToken,
    mut f: F,
) -> Result<T, RetryError<E>>
where
    E: fmt::Display + fmt::Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
{
    for attempt in 1..=cfg.max_attempts {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled);
        }
        match f().await {
            Attempt::Ok(value) => return Ok(value),
            Attempt::Permanent(err) => return Err(RetryError::Permanent(err)),
            Attempt::Retryable(err) => {
                if attempt == cfg.max_attempts {
                    return Err(RetryError::Exhausted {
                        name: name.to_string(),
                        attempts: cfg.max_attempts,
                        last: err,
                    });
                }
                let delay = cfg.delay_for_attempt(attempt);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                }
            }
        }
    }
    unreachable!("max_attempts >= 1 guarantees the loop returns before exhausting its range")
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;

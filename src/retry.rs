//! Bounded retry with exponential backoff
//!
//! Used by the fetcher, the classifier client, and the record store. Each of
//! their error types reports whether a failure is worth retrying through
//! [`Transient`]; permanent failures are returned on the first attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Upper bound for a single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Errors that can tell whether retrying might help
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// How many times to try an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the second attempt; doubled for each further attempt
    pub initial_backoff: Duration,

    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: MAX_BACKOFF,
        }
    }

    /// A single attempt, no retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay after the given failed attempt (0-based), before jitter
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Runs `op` until it succeeds, fails permanently, or runs out of attempts
///
/// The last error is returned unchanged so callers can still match on it.
pub async fn retry_async<T, E, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;

                if !e.is_transient() || attempt >= policy.max_attempts {
                    return Err(e);
                }

                let backoff = policy.backoff_for(attempt - 1);
                let backoff_ms = backoff.as_millis() as u64;
                let jitter = rand::random_range(0..=backoff_ms / 2);
                let delay = Duration::from_millis(backoff_ms + jitter);

                tracing::warn!(
                    "{} attempt {}/{} failed: {}, retrying in {}ms",
                    operation,
                    attempt,
                    policy.max_attempts,
                    e,
                    delay.as_millis()
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

//! Jittered exponential-backoff retry for outbound platform calls.
//!
//! Idempotent client calls go through [`RetryPolicy::run`], which repeats
//! the request while the failure is transient (see
//! [`RemoteError::is_transient`]) and attempts remain. Calls that create
//! remote state use [`RetryPolicy::run_if`] with a stricter predicate.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::RemoteError;

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Fraction of each delay that is randomised, in `0.0..=1.0`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: 0.5,
        }
    }
}

impl RetryPolicy {
    /// A policy that performs exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `operation` is only used for logging.
    pub async fn run<T, F, Fut>(&self, operation: &str, op: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        self.run_if(operation, RemoteError::is_transient, op).await
    }

    /// Like [`run`](Self::run), but only failures accepted by `retryable`
    /// are retried.
    pub async fn run_if<T, F, Fut>(
        &self,
        operation: &str,
        retryable: fn(&RemoteError) -> bool,
        mut op: F,
    ) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delay = self.initial_delay;
        let mut attempt = 1u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if retryable(&e) && attempt < max_attempts => {
                    let wait = jittered(delay, self.jitter);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts,
                        delay_ms = wait.as_millis() as u64,
                        error = %e,
                        "Remote call failed, retrying",
                    );
                    tokio::time::sleep(wait).await;
                    delay = next_delay(delay, self);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Calculate the next backoff delay from the current delay and policy.
///
/// The result is clamped to [`RetryPolicy::max_delay`].
pub fn next_delay(current: Duration, policy: &RetryPolicy) -> Duration {
    let next_ms = (current.as_millis() as f64 * policy.multiplier) as u64;
    Duration::from_millis(next_ms).min(policy.max_delay)
}

/// Randomly shorten `delay` by up to `jitter` of its length.
pub fn jittered(delay: Duration, jitter: f64) -> Duration {
    let jitter = jitter.clamp(0.0, 1.0);
    if jitter == 0.0 || delay.is_zero() {
        return delay;
    }
    let factor = 1.0 - rand::rng().random_range(0.0..=jitter);
    delay.mul_f64(factor)
}

//! Bounded retries for request-level operations.
//!
//! # Responsibilities
//! - Run an operation up to `max_attempts` times
//! - Sleep with capped linear backoff between attempts
//! - Return the last error once attempts are exhausted

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::resilience::backoff::{linear_backoff, DEFAULT_CAP_MS, DEFAULT_STEP_MS};

/// Attempt cap and backoff schedule for one logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff increment in milliseconds.
    pub step_ms: u64,
    /// Backoff ceiling in milliseconds.
    pub cap_ms: u64,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        linear_backoff(attempt, self.step_ms, self.cap_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            step_ms: DEFAULT_STEP_MS,
            cap_ms: DEFAULT_CAP_MS,
        }
    }
}

impl From<&CacheConfig> for RetryPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            max_attempts: config.max_retries_per_request.max(1),
            step_ms: config.backoff_step_ms,
            cap_ms: config.backoff_cap_ms,
        }
    }
}

/// Run `op` until it succeeds or the policy's attempt cap is reached.
///
/// `op` receives the 1-based attempt number.
pub async fn with_retries<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.max_attempts => {
                tracing::debug!(attempt, error = %e, "Retry attempts exhausted");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay(attempt);
                tracing::debug!(attempt, delay = ?delay, error = %e, "Retrying operation");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

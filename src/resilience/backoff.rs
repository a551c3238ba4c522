//! Capped linear backoff.

use std::time::Duration;

/// Delay increment per attempt, in milliseconds.
pub const DEFAULT_STEP_MS: u64 = 50;

/// Upper bound for any single delay, in milliseconds.
pub const DEFAULT_CAP_MS: u64 = 2000;

/// Calculate `min(attempt * step_ms, cap_ms)`.
///
/// Attempt numbering starts at 1; attempt 0 yields no delay.
pub fn linear_backoff(attempt: u32, step_ms: u64, cap_ms: u64) -> Duration {
    let delay_ms = u64::from(attempt).saturating_mul(step_ms);
    Duration::from_millis(delay_ms.min(cap_ms))
}

/// Reconnect delay for the cache client with the default schedule.
pub fn reconnect_delay(attempt: u32) -> Duration {
    linear_backoff(attempt, DEFAULT_STEP_MS, DEFAULT_CAP_MS)
}

//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Cache connection lost:
//!     → backoff.rs (capped linear delay per reconnect attempt)
//!     → supervisor task sleeps, reconnects, repeats forever
//!
//! Request-level cache operation:
//!     → retries.rs (bounded attempts, backoff between them)
//!     → surface the last error to the caller
//! ```
//!
//! # Design Decisions
//! - Background reconnection never gives up; request-level retries do
//! - Delays are deterministic (no jitter) so the schedule is observable
//! - No request-level timeout; attempt caps bound waiting instead

pub mod backoff;
pub mod retries;

pub use backoff::{linear_backoff, reconnect_delay};
pub use retries::{with_retries, RetryPolicy};

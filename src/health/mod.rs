//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health        → probe.rs::liveness       (no I/O)
//! GET /health/db     → probe.rs::probe_database → DatabaseHandle::ping
//! GET /health/redis  → probe.rs::probe_cache    → CacheHandle::ping
//!     → report (always HTTP 200, failure in-band)
//!     → api_resource_up gauge
//! ```
//!
//! # Design Decisions
//! - Probes catch their own failures; nothing reaches the error normalizer
//! - Each probe touches exactly one resource, so concurrent probes are independent

pub mod probe;

pub use probe::{
    liveness, probe_cache, probe_database, Connection, Liveness, ProbeStatus, Resource,
    ResourceReport,
};

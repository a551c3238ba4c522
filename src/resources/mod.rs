//! Shared resource handles.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     DatabaseConfig → database.rs (lazy Postgres pool) → DatabaseHandle
//!     CacheConfig    → cache.rs (Redis client + reconnect supervisor) → CacheHandle
//!     → Resources { database, cache }
//!     → decorate stage attaches a clone to every request context
//! ```
//!
//! # Design Decisions
//! - Handles are constructed once and injected; nothing reads a global
//! - Each handle wraps a trait object so tests can substitute doubles
//! - Handles are cheap `Arc` clones; pooling and reconnection live inside

pub mod cache;
pub mod database;

use std::time::Duration;

use thiserror::Error;

pub use cache::{CacheBackend, CacheHandle, RedisCache};
pub use database::{DatabaseBackend, DatabaseHandle, PgDatabase};

pub use crate::pipeline::stage::BoxFuture;

/// Failure talking to a shared resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("redis error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("redis connection is not established")]
    CacheDisconnected,

    #[error("redis {operation} timed out after {after:?}")]
    CacheTimeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("{0}")]
    Unavailable(String),
}

/// The resource handles made available to every route handler.
#[derive(Clone)]
pub struct Resources {
    pub database: DatabaseHandle,
    pub cache: CacheHandle,
}

impl Resources {
    pub fn new(database: DatabaseHandle, cache: CacheHandle) -> Self {
        Self { database, cache }
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources").finish_non_exhaustive()
    }
}

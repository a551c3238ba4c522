//! Database handle.
//!
//! # Responsibilities
//! - Build the shared Postgres pool once from the connection string
//! - Offer a minimal round-trip (`SELECT 1`) for readiness probing
//!
//! # Design Decisions
//! - The pool connects lazily: a bad URL fails startup, an unreachable
//!   server only shows up in probes and queries
//! - Pooling and connection reuse are sqlx's concern

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::resources::{BoxFuture, ResourceError};

/// Operations the service needs from its database.
pub trait DatabaseBackend: Send + Sync + 'static {
    /// Issue a minimal round-trip query.
    fn ping(&self) -> BoxFuture<'_, Result<(), ResourceError>>;
}

/// Shared reference to the process-wide database backend.
#[derive(Clone)]
pub struct DatabaseHandle {
    backend: Arc<dyn DatabaseBackend>,
}

impl DatabaseHandle {
    /// Build the Postgres pool described by `config`.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, ResourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy(&config.url)?;

        tracing::info!(max_connections = config.max_connections, "Database pool created");
        Ok(Self::from_backend(PgDatabase::new(pool)))
    }

    /// Wrap an arbitrary backend.
    pub fn from_backend(backend: impl DatabaseBackend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub async fn ping(&self) -> Result<(), ResourceError> {
        self.backend.ping().await
    }
}

/// Postgres-backed implementation.
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DatabaseBackend for PgDatabase {
    fn ping(&self) -> BoxFuture<'_, Result<(), ResourceError>> {
        Box::pin(async move {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
    }
}

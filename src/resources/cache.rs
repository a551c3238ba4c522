//! Cache handle with a self-healing Redis connection.
//!
//! # Responsibilities
//! - Build the Redis client once from the connection string
//! - Keep a multiplexed connection alive from a background supervisor
//! - Bound request-level operations to a fixed number of attempts
//!
//! # Connection lifecycle
//! ```text
//! Connecting ──ok──▶ Connected ──io error or timeout seen by a request──▶ Connecting
//!     │                                                                     ▲
//!     └──error or connect timeout──▶ sleep min(50·n, 2000) ms ────────────────┘
//! ```
//!
//! # Design Decisions
//! - The supervisor retries forever; callers never re-acquire the handle
//! - Handshakes and command replies are both bounded by timeouts, so a
//!   silent server cannot stall the supervisor or a request
//! - The live connection sits in an `ArcSwapOption`, so readers never lock
//! - Each connection carries a generation so a stale failure report cannot
//!   tear down a newer connection

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use redis::aio::MultiplexedConnection;
use tokio::sync::{broadcast, Notify};

use crate::config::CacheConfig;
use crate::resilience::backoff::linear_backoff;
use crate::resilience::retries::{with_retries, RetryPolicy};
use crate::resources::{BoxFuture, ResourceError};

/// Operations the service needs from its cache.
pub trait CacheBackend: Send + Sync + 'static {
    /// Minimal reachability probe.
    fn ping(&self) -> BoxFuture<'_, Result<(), ResourceError>>;
}

/// Shared reference to the process-wide cache backend.
#[derive(Clone)]
pub struct CacheHandle {
    backend: Arc<dyn CacheBackend>,
}

impl CacheHandle {
    /// Open the Redis client described by `config` and start its
    /// reconnect supervisor. The supervisor exits on `shutdown`.
    pub fn connect(
        config: &CacheConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<Self, ResourceError> {
        let cache = RedisCache::open(config)?;
        tokio::spawn(Arc::clone(&cache).supervise(shutdown));
        Ok(Self { backend: cache })
    }

    /// Wrap an arbitrary backend.
    pub fn from_backend(backend: impl CacheBackend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub async fn ping(&self) -> Result<(), ResourceError> {
        self.backend.ping().await
    }
}

struct LiveConnection {
    generation: u64,
    conn: MultiplexedConnection,
}

/// Redis client with background reconnection and bounded per-request retries.
pub struct RedisCache {
    client: redis::Client,
    slot: ArcSwapOption<LiveConnection>,
    generation: AtomicU64,
    lost: Notify,
    retry: RetryPolicy,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl RedisCache {
    /// Parse the connection string and build an unconnected client.
    pub fn open(config: &CacheConfig) -> Result<Arc<Self>, ResourceError> {
        let client = redis::Client::open(config.url.as_str())?;
        Ok(Arc::new(Self {
            client,
            slot: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
            lost: Notify::new(),
            retry: RetryPolicy::from(config),
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            response_timeout: Duration::from_millis(config.response_timeout_ms),
        }))
    }

    /// Connect, wait for loss, reconnect. Runs until shutdown.
    pub async fn supervise(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut attempt: u32 = 0;
        loop {
            match self.establish().await {
                Ok(conn) => {
                    attempt = 0;
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
                    self.slot
                        .store(Some(Arc::new(LiveConnection { generation, conn })));
                    tracing::info!(generation, "Connected to Redis");

                    tokio::select! {
                        _ = self.lost.notified() => {
                            tracing::warn!(generation, "Redis connection lost, reconnecting");
                        }
                        _ = shutdown.recv() => break,
                    }
                }
                Err(e) => {
                    attempt = attempt.saturating_add(1);
                    let delay = linear_backoff(attempt, self.retry.step_ms, self.retry.cap_ms);
                    tracing::error!(attempt, delay = ?delay, error = %e, "Redis error");

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = shutdown.recv() => break,
                    }
                }
            }
        }
        self.slot.store(None);
        tracing::info!("Redis supervisor stopped");
    }

    async fn establish(&self) -> Result<MultiplexedConnection, ResourceError> {
        tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| ResourceError::CacheTimeout {
            operation: "connect",
            after: self.connect_timeout,
        })?
        .map_err(ResourceError::from)
    }

    async fn ping_once(&self) -> Result<(), ResourceError> {
        let live = self
            .slot
            .load_full()
            .ok_or(ResourceError::CacheDisconnected)?;
        let mut conn = live.conn.clone();

        let reply: Result<Result<String, redis::RedisError>, _> = tokio::time::timeout(
            self.response_timeout,
            redis::cmd("PING").query_async(&mut conn),
        )
        .await;
        match reply {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => {
                if e.is_connection_dropped() || e.is_io_error() || e.is_timeout() {
                    self.report_lost(live.generation);
                }
                Err(e.into())
            }
            Err(_) => {
                self.report_lost(live.generation);
                Err(ResourceError::CacheTimeout {
                    operation: "PING",
                    after: self.response_timeout,
                })
            }
        }
    }

    /// Drop the connection of `generation` and wake the supervisor, unless a
    /// newer connection already replaced it.
    fn report_lost(&self, generation: u64) {
        let previous = self.slot.rcu(|current| match current {
            Some(live) if live.generation == generation => None,
            other => other.clone(),
        });
        if matches!(previous, Some(ref live) if live.generation == generation) {
            self.lost.notify_one();
        }
    }
}

impl CacheBackend for RedisCache {
    fn ping(&self) -> BoxFuture<'_, Result<(), ResourceError>> {
        Box::pin(with_retries(&self.retry, move |_| self.ping_once()))
    }
}

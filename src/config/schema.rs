//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the API service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Database connection settings.
    pub database: DatabaseConfig,

    /// Cache connection and retry settings.
    pub cache: CacheConfig,

    /// Static asset serving.
    pub static_files: StaticFilesConfig,

    /// API documentation endpoints.
    pub docs: DocsConfig,

    /// Authentication delegate settings.
    pub auth: AuthConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Cross-origin policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins in order. A single `"*"` allows any origin.
    pub origins: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// Preflight cache duration in seconds.
    pub max_age_secs: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: vec!["*".to_string()],
            allow_credentials: true,
            max_age_secs: Some(5),
        }
    }
}

/// Database pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Postgres connection string.
    pub url: String,

    /// Maximum pooled connections.
    pub max_connections: u32,

    /// How long to wait for a pooled connection, in seconds.
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/shalom".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

/// Cache client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection string.
    pub url: String,

    /// Attempts per request-level operation before failing, counting the
    /// first one. A value of 3 therefore allows 2 retries, one fewer than
    /// an ioredis `maxRetriesPerRequest` of 3.
    pub max_retries_per_request: u32,

    /// Give up on a connection handshake after this many milliseconds.
    pub connect_timeout_ms: u64,

    /// Give up on a single command reply after this many milliseconds.
    pub response_timeout_ms: u64,

    /// Reconnect backoff increment in milliseconds.
    pub backoff_step_ms: u64,

    /// Reconnect backoff ceiling in milliseconds.
    pub backoff_cap_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            max_retries_per_request: 3,
            connect_timeout_ms: 5000,
            response_timeout_ms: 2000,
            backoff_step_ms: 50,
            backoff_cap_ms: 2000,
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Serve static assets at all.
    pub enabled: bool,

    /// Local directory holding the assets.
    pub dir: String,

    /// URL prefix the assets are mounted under.
    pub prefix: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "uploads".to_string(),
            prefix: "/uploads".to_string(),
        }
    }
}

/// Documentation endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Expose the documentation endpoints.
    pub enabled: bool,

    /// Path of the HTML viewer; the JSON document lives at `{path}/json`.
    pub path: String,

    /// API title.
    pub title: String,

    /// API version string.
    pub version: String,

    /// API description.
    pub description: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/swagger".to_string(),
            title: "Shalom API".to_string(),
            version: "1.0.0".to_string(),
            description: "API for Shalom platform".to_string(),
        }
    }
}

/// Authentication delegate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Path prefix forwarded to the delegate.
    pub prefix: String,

    /// Base URL of the external auth service.
    pub upstream_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/auth".to_string(),
            upstream_url: "http://127.0.0.1:3001".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

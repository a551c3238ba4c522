//! Liveness and resource readiness probes.
//!
//! Probes never fail: every outcome, including an unreachable resource,
//! becomes a report that the health routes send with status 200.

use chrono::{SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::observability::metrics;
use crate::resources::{CacheHandle, DatabaseHandle, ResourceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    Connected,
    Disconnected,
}

/// A probed shared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Database,
    Cache,
}

impl Resource {
    /// Key under which the connection state is reported, and metric label.
    pub fn key(&self) -> &'static str {
        match self {
            Resource::Database => "database",
            Resource::Cache => "redis",
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Liveness {
    pub status: ProbeStatus,
    pub timestamp: String,
}

/// Report the process as alive, stamped with the current UTC time.
pub fn liveness() -> Liveness {
    Liveness {
        status: ProbeStatus::Ok,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Outcome of one readiness probe.
///
/// Serializes as `{"status", "<resource key>", "error"?}`, for example
/// `{"status":"error","redis":"disconnected","error":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReport {
    pub resource: Resource,
    pub status: ProbeStatus,
    pub connection: Connection,
    pub error: Option<String>,
}

impl ResourceReport {
    fn from_result(resource: Resource, result: Result<(), ResourceError>) -> Self {
        match result {
            Ok(()) => Self {
                resource,
                status: ProbeStatus::Ok,
                connection: Connection::Connected,
                error: None,
            },
            Err(e) => Self {
                resource,
                status: ProbeStatus::Error,
                connection: Connection::Disconnected,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ProbeStatus::Ok
    }
}

impl Serialize for ResourceReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.error.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry(self.resource.key(), &self.connection)?;
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        map.end()
    }
}

pub async fn probe_database(database: &DatabaseHandle) -> ResourceReport {
    record(ResourceReport::from_result(
        Resource::Database,
        database.ping().await,
    ))
}

pub async fn probe_cache(cache: &CacheHandle) -> ResourceReport {
    record(ResourceReport::from_result(Resource::Cache, cache.ping().await))
}

fn record(report: ResourceReport) -> ResourceReport {
    let resource = report.resource.key();
    metrics::record_resource_health(resource, report.is_ok());
    if let Some(error) = &report.error {
        tracing::warn!(resource, error = %error, "Health probe failed");
    }
    report
}

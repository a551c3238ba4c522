//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, status, route
//! - `api_request_duration_seconds` (histogram): latency by method, route
//! - `api_resource_up` (gauge): 1 = reachable, 0 = unreachable, by resource
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels use route patterns, never raw paths

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "api_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "api_request_duration_seconds";
pub const RESOURCE_UP: &str = "api_resource_up";

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests handled");
    describe_histogram!(REQUEST_DURATION_SECONDS, "HTTP request duration in seconds");
    describe_gauge!(RESOURCE_UP, "Whether a shared resource answered its last probe");

    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, route: &str, elapsed: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(elapsed.as_secs_f64());
}

/// Record the outcome of a resource probe.
pub fn record_resource_health(resource: &'static str, up: bool) {
    gauge!(RESOURCE_UP, "resource" => resource).set(if up { 1.0 } else { 0.0 });
}

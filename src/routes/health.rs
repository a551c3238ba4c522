//! Health routes.

use axum::response::{IntoResponse, Json};

use crate::health::{liveness, probe_cache, probe_database};
use crate::pipeline::context::HandlerContext;
use crate::routing::{handler_fn, Route};

pub const TAG: &str = "health";

/// `GET /health`, `GET /health/db`, `GET /health/redis`, in that order.
pub fn health_routes() -> Vec<Route> {
    vec![
        Route::get(
            "/health",
            handler_fn(|_, _| async { Ok(Json(liveness()).into_response()) }),
        )
        .tag(TAG)
        .summary("Liveness check")
        .description("Reports that the process is up, with the current server time"),
        Route::get(
            "/health/db",
            handler_fn(|_, ctx: HandlerContext| async move {
                let resources = ctx.resources()?;
                Ok(Json(probe_database(&resources.database).await).into_response())
            }),
        )
        .tag(TAG)
        .summary("Database readiness")
        .description("Runs a minimal query against the database pool"),
        Route::get(
            "/health/redis",
            handler_fn(|_, ctx: HandlerContext| async move {
                let resources = ctx.resources()?;
                Ok(Json(probe_cache(&resources.cache).await).into_response())
            }),
        )
        .tag(TAG)
        .summary("Redis readiness")
        .description("Pings the cache through its reconnecting client"),
    ]
}

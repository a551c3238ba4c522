//! Server-Timing instrumentation.
//!
//! The dispatcher records how long each stage and the handler took; this
//! stage renders those durations as a `Server-Timing` response header.

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::response::Response;

use crate::pipeline::context::RequestContext;
use crate::pipeline::error::ServiceError;
use crate::pipeline::stage::{BoxFuture, Flow, Stage};

pub static SERVER_TIMING: HeaderName = HeaderName::from_static("server-timing");

#[derive(Debug, Clone, Copy, Default)]
pub struct TimingStage;

impl TimingStage {
    pub fn new() -> Self {
        Self
    }
}

/// Render `name;dur=<ms>` entries plus a trailing `total`.
pub fn server_timing_value(ctx: &RequestContext) -> String {
    ctx.timings()
        .iter()
        .map(|timing| (timing.name, timing.duration))
        .chain(std::iter::once(("total", ctx.elapsed())))
        .map(|(name, duration)| format!("{};dur={:.3}", name, duration.as_secs_f64() * 1000.0))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Stage for TimingStage {
    fn name(&self) -> &'static str {
        "timing"
    }

    fn on_request<'a>(
        &'a self,
        _ctx: &'a mut RequestContext,
        _request: &'a mut Request<Body>,
    ) -> BoxFuture<'a, Result<Flow, ServiceError>> {
        Box::pin(async { Ok(Flow::Continue) })
    }

    fn on_response(&self, ctx: &RequestContext, response: &mut Response) {
        match HeaderValue::from_str(&server_timing_value(ctx)) {
            Ok(value) => {
                response.headers_mut().insert(SERVER_TIMING.clone(), value);
            }
            Err(e) => tracing::debug!(error = %e, "Skipping Server-Timing header"),
        }
    }
}

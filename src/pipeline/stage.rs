//! The intercept-or-continue capability shared by all pipeline stages.

use std::future::Future;
use std::pin::Pin;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::pipeline::context::RequestContext;
use crate::pipeline::error::ServiceError;

/// A boxed future borrowed from a stage and its request.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a stage's request hook.
pub enum Flow {
    /// Pass control to the next stage (or the route table).
    Continue,
    /// Answer the request now; later stages and routes do not run.
    Respond(Response),
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flow::Continue => f.write_str("Continue"),
            Flow::Respond(response) => write!(f, "Respond({})", response.status()),
        }
    }
}

/// One named step of the request pipeline.
///
/// # Invariants
///
/// - `on_request` runs at most once per request, in registration order
/// - `on_response` runs for every stage whose `on_request` ran, in reverse
///   order, whatever the outcome (handler result, short-circuit, or error)
pub trait Stage: Send + Sync + 'static {
    /// Name used for timing and logs.
    fn name(&self) -> &'static str;

    /// Inspect or decorate the request, or short-circuit with a response.
    fn on_request<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: &'a mut Request<Body>,
    ) -> BoxFuture<'a, Result<Flow, ServiceError>>;

    /// Adjust the outgoing response.
    fn on_response(&self, _ctx: &RequestContext, _response: &mut Response) {}
}

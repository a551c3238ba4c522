//! Route handler type.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::pipeline::context::HandlerContext;
use crate::pipeline::error::ServiceError;
use crate::pipeline::stage::BoxFuture;

/// A type-erased async route handler.
pub type BoxedHandler = Arc<
    dyn Fn(Request<Body>, HandlerContext) -> BoxFuture<'static, Result<Response, ServiceError>>
        + Send
        + Sync
        + 'static,
>;

/// Box an async function as a route handler.
pub fn handler_fn<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Request<Body>, HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, ServiceError>> + Send + 'static,
{
    Arc::new(move |request, ctx| Box::pin(f(request, ctx)))
}

//! The request dispatcher.
//!
//! One loop drives every request:
//!
//! ```text
//! for stage in stages (registration order):
//!     Continue      → next stage
//!     Respond(r)    → stop, r is the response
//!     Err(e)        → stop, normalizer renders e
//! route table scan (first match) → handler → Ok(r) | Err(e)
//! no match → NotFound → normalizer
//! for stage that ran (reverse order): on_response(&mut response)
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::FutureExt;

use crate::observability::metrics;
use crate::pipeline::context::RequestContext;
use crate::pipeline::error::ServiceError;
use crate::pipeline::normalizer::ErrorNormalizer;
use crate::pipeline::stage::{Flow, Stage};
use crate::routing::RouteTable;

/// A type-erased stage that can be stored in a vector.
pub type BoxedStage = Arc<dyn Stage>;

/// Stages plus route table, fixed at construction.
pub struct Service {
    stages: Vec<BoxedStage>,
    routes: Arc<RouteTable>,
    normalizer: ErrorNormalizer,
}

impl Service {
    pub fn builder(routes: Arc<RouteTable>) -> ServiceBuilder {
        ServiceBuilder {
            stages: Vec::new(),
            routes,
        }
    }

    /// Handle one request. Always yields exactly one response.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let mut ctx = RequestContext::new(&request);

        let (ran, outcome) = self.run(&mut ctx, request).await;
        let mut response = match outcome {
            Ok(response) => response,
            Err(error) => self.normalizer.respond(&ctx, error),
        };

        for stage in self.stages[..ran].iter().rev() {
            stage.on_response(&ctx, &mut response);
        }

        metrics::record_request(
            ctx.method().as_str(),
            response.status().as_u16(),
            ctx.route().unwrap_or("none"),
            ctx.elapsed(),
        );
        tracing::debug!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            status = response.status().as_u16(),
            elapsed = ?ctx.elapsed(),
            "Request completed"
        );
        response
    }

    /// Run stages then dispatch. Returns how many stages ran.
    async fn run(
        &self,
        ctx: &mut RequestContext,
        mut request: Request<Body>,
    ) -> (usize, Result<Response, ServiceError>) {
        for (index, stage) in self.stages.iter().enumerate() {
            let started = Instant::now();
            let flow = AssertUnwindSafe(async { stage.on_request(ctx, &mut request).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(ServiceError::Panic(panic_message(panic))));
            ctx.record_timing(stage.name(), started.elapsed());

            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Respond(response)) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        stage = stage.name(),
                        status = response.status().as_u16(),
                        "Stage short-circuited request"
                    );
                    return (index + 1, Ok(response));
                }
                Err(error) => return (index + 1, Err(error)),
            }
        }

        let started = Instant::now();
        let result = self.dispatch(ctx, request).await;
        ctx.record_timing("handler", started.elapsed());
        (self.stages.len(), result)
    }

    async fn dispatch(
        &self,
        ctx: &mut RequestContext,
        request: Request<Body>,
    ) -> Result<Response, ServiceError> {
        let route = self.routes.find(&request).ok_or_else(|| ServiceError::NotFound {
            method: ctx.method().clone(),
            path: ctx.path().to_string(),
        })?;
        ctx.set_route(route.path().to_string());

        let handler_ctx = ctx.handler_context();
        AssertUnwindSafe(async move { route.call(request, handler_ctx).await })
            .catch_unwind()
            .await
            .map_err(|panic| ServiceError::Panic(panic_message(panic)))?
    }

    /// Names of the stages, in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Builder for constructing a [`Service`]. Stage order is call order.
pub struct ServiceBuilder {
    stages: Vec<BoxedStage>,
    routes: Arc<RouteTable>,
}

impl ServiceBuilder {
    pub fn stage(mut self, stage: impl Stage) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn build(self) -> Service {
        tracing::info!(
            stages = ?self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            routes = self.routes.len(),
            "Pipeline assembled"
        );
        Service {
            stages: self.stages,
            routes: self.routes,
            normalizer: ErrorNormalizer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::BoxFuture;
    use crate::routing::{handler_fn, Route};
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records calls; optionally short-circuits with 418.
    struct Probe {
        name: &'static str,
        short_circuit: bool,
        requests: Arc<AtomicUsize>,
    }

    impl Stage for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn on_request<'a>(
            &'a self,
            _ctx: &'a mut RequestContext,
            _request: &'a mut Request<Body>,
        ) -> BoxFuture<'a, Result<Flow, ServiceError>> {
            Box::pin(async move {
                self.requests.fetch_add(1, Ordering::SeqCst);
                if self.short_circuit {
                    Ok(Flow::Respond(StatusCode::IM_A_TEAPOT.into_response()))
                } else {
                    Ok(Flow::Continue)
                }
            })
        }

        fn on_response(&self, _ctx: &RequestContext, response: &mut Response) {
            response
                .headers_mut()
                .append("x-stages", HeaderValue::from_static(self.name));
        }
    }

    fn probe(name: &'static str, short_circuit: bool) -> (Probe, Arc<AtomicUsize>) {
        let requests = Arc::new(AtomicUsize::new(0));
        (
            Probe {
                name,
                short_circuit,
                requests: requests.clone(),
            },
            requests,
        )
    }

    async fn explode() -> Result<Response, ServiceError> {
        panic!("handler blew up")
    }

    fn table() -> Arc<RouteTable> {
        let mut table = RouteTable::new();
        table.push(Route::get(
            "/ok",
            handler_fn(|_, _| async { Ok("ok".into_response()) }),
        ));
        table.push(Route::get(
            "/boom",
            handler_fn(|_, _| explode()),
        ));
        Arc::new(table)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_short_circuit_skips_later_stages_and_routes() {
        let (first, first_calls) = probe("first", false);
        let (second, second_calls) = probe("second", true);
        let (third, third_calls) = probe("third", false);
        let service = Service::builder(table())
            .stage(first)
            .stage(second)
            .stage(third)
            .build();

        let response = service.handle(get("/ok")).await;
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);

        let stages: Vec<_> = response.headers().get_all("x-stages").iter().collect();
        assert_eq!(stages, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_unmatched_route_is_normalized() {
        let (first, _) = probe("first", false);
        let service = Service::builder(table()).stage(first).build();

        let response = service.handle(get("/missing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get("x-stages").unwrap(), "first");
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_internal_error() {
        let service = Service::builder(table()).build();
        let response = service.handle(get("/boom")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    struct Exploding;

    impl Stage for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        fn on_request<'a>(
            &'a self,
            _ctx: &'a mut RequestContext,
            _request: &'a mut Request<Body>,
        ) -> BoxFuture<'a, Result<Flow, ServiceError>> {
            Box::pin(async { panic!("stage blew up") })
        }
    }

    #[tokio::test]
    async fn test_stage_panic_becomes_internal_error() {
        let (first, _) = probe("first", false);
        let (last, last_calls) = probe("last", false);
        let service = Arc::new(
            Service::builder(table())
                .stage(first)
                .stage(Exploding)
                .stage(last)
                .build(),
        );

        // Spawned so an escaping panic would surface as a JoinError.
        let task = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.handle(get("/ok")).await }
        });
        let response = task.await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(last_calls.load(Ordering::SeqCst), 0);
        assert_eq!(response.headers().get("x-stages").unwrap(), "first");
    }

    #[tokio::test]
    async fn test_panic_while_building_handler_future_is_caught() {
        let mut table = RouteTable::new();
        table.push(Route::get(
            "/eager",
            handler_fn(|_, _| -> std::future::Ready<Result<Response, ServiceError>> {
                panic!("eager handler")
            }),
        ));
        let service = Service::builder(Arc::new(table)).build();
        let response = service.handle(get("/eager")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_stage_names_preserve_order() {
        let (a, _) = probe("a", false);
        let (b, _) = probe("b", false);
        let service = Service::builder(table()).stage(a).stage(b).build();
        assert_eq!(service.stage_names(), vec!["a", "b"]);
    }
}

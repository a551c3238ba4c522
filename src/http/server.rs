//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router that hands every request to the pipeline
//! - Wire up middleware (tracing, request ID)
//! - Bind the server to a listener and drain it on shutdown

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, response::Response, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::request::X_REQUEST_ID;
use crate::pipeline::Service;

/// HTTP front end for the request pipeline.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            router: Self::build_router(service),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost last: the request ID is set before tracing
    /// sees the request and copied onto the response afterwards.
    fn build_router(service: Arc<Service>) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(service)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
    }

    /// The router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch(State(service): State<Arc<Service>>, request: Request<Body>) -> Response {
    service.handle(request).await
}

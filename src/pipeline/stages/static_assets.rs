//! Static file serving under a URL prefix.
//!
//! `GET`/`HEAD` requests below `{prefix}/` are answered from the configured
//! directory through `tower-http`'s `ServeDir`. Requests matching a
//! registered route are left to the route, and missing files fall through
//! to route dispatch so they end up as the regular 404 envelope.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, Uri};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::config::StaticFilesConfig;
use crate::pipeline::context::RequestContext;
use crate::pipeline::error::ServiceError;
use crate::pipeline::stage::{BoxFuture, Flow, Stage};
use crate::routing::RouteTable;

#[derive(Debug, Clone)]
pub struct StaticAssetsStage {
    prefix: String,
    serve: ServeDir,
    routes: Arc<RouteTable>,
}

impl StaticAssetsStage {
    pub fn new(config: &StaticFilesConfig, routes: Arc<RouteTable>) -> Self {
        let prefix = config.prefix.trim_end_matches('/').to_string();
        let serve = ServeDir::new(&config.dir).append_index_html_on_directories(false);
        Self {
            prefix,
            serve,
            routes,
        }
    }

    /// Path below the prefix, as an absolute URI for `ServeDir`.
    fn strip_prefix(&self, uri: &Uri) -> Option<Uri> {
        let rest = uri.path().strip_prefix(&self.prefix)?;
        if !rest.starts_with('/') || rest.len() < 2 {
            return None;
        }
        let target = match uri.query() {
            Some(query) => format!("{}?{}", rest, query),
            None => rest.to_string(),
        };
        target.parse().ok()
    }
}

impl Stage for StaticAssetsStage {
    fn name(&self) -> &'static str {
        "static-assets"
    }

    fn on_request<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: &'a mut Request<Body>,
    ) -> BoxFuture<'a, Result<Flow, ServiceError>> {
        Box::pin(async move {
            if request.method() != Method::GET && request.method() != Method::HEAD {
                return Ok(Flow::Continue);
            }
            let Some(uri) = self.strip_prefix(request.uri()) else {
                return Ok(Flow::Continue);
            };
            if self.routes.find(request).is_some() {
                return Ok(Flow::Continue);
            }

            let mut forwarded = Request::new(Body::empty());
            *forwarded.method_mut() = request.method().clone();
            *forwarded.uri_mut() = uri;
            *forwarded.headers_mut() = request.headers().clone();

            let response = match self.serve.clone().oneshot(forwarded).await {
                Ok(response) => response,
                Err(never) => match never {},
            };
            if response.status() == StatusCode::NOT_FOUND {
                tracing::debug!(request_id = %ctx.request_id(), path = %ctx.path(), "Static file not found");
                return Ok(Flow::Continue);
            }
            Ok(Flow::Respond(response.map(Body::new)))
        })
    }
}

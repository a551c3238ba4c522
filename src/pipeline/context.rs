//! Per-request context threaded through the pipeline.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Extensions, Method, Request};
use uuid::Uuid;

use crate::http::request::request_id_from;
use crate::pipeline::error::ServiceError;
use crate::resources::Resources;

/// Time spent in one stage (or the handler).
#[derive(Debug, Clone)]
pub struct StageTiming {
    pub name: &'static str,
    pub duration: Duration,
}

/// Mutable state for a single request, owned by the dispatcher.
///
/// Stages read and augment it; handlers receive a [`HandlerContext`]
/// snapshot once every stage has run.
#[derive(Debug)]
pub struct RequestContext {
    request_id: String,
    method: Method,
    path: String,
    started: Instant,
    timings: Vec<StageTiming>,
    resources: Option<Resources>,
    route: Option<String>,
    extensions: Extensions,
}

impl RequestContext {
    pub fn new(request: &Request<Body>) -> Self {
        let request_id = request_id_from(request.headers())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self {
            request_id,
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            started: Instant::now(),
            timings: Vec::new(),
            resources: None,
            route: None,
            extensions: Extensions::new(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Time since the request entered the pipeline.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn record_timing(&mut self, name: &'static str, duration: Duration) {
        self.timings.push(StageTiming { name, duration });
    }

    pub fn timings(&self) -> &[StageTiming] {
        &self.timings
    }

    /// Attach the shared resource handles. Allowed once per request.
    pub fn decorate(&mut self, resources: Resources) -> Result<(), ServiceError> {
        if self.resources.is_some() {
            return Err(ServiceError::Internal(
                "resources attached twice to one request".to_string(),
            ));
        }
        self.resources = Some(resources);
        Ok(())
    }

    pub fn resources(&self) -> Option<&Resources> {
        self.resources.as_ref()
    }

    /// Pattern of the route that handled the request, once dispatched.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn set_route(&mut self, pattern: impl Into<String>) {
        self.route = Some(pattern.into());
    }

    /// Typed scratch space for stages.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Snapshot handed to the matched route handler.
    pub fn handler_context(&self) -> HandlerContext {
        HandlerContext {
            request_id: self.request_id.clone(),
            resources: self.resources.clone(),
        }
    }
}

/// What a route handler can see of its request context.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    request_id: String,
    resources: Option<Resources>,
}

impl HandlerContext {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The decorated resource handles.
    ///
    /// Missing resources mean the pipeline was composed without the
    /// decoration stage, which surfaces as an unclassified failure.
    pub fn resources(&self) -> Result<&Resources, ServiceError> {
        self.resources.as_ref().ok_or_else(|| {
            ServiceError::Internal("resource handles were not attached to the request".to_string())
        })
    }
}

//! Route table and lookup.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Look up the first route matching a request
//! - Expose route metadata for the documentation stage
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) scan; first match wins, no specificity ranking
//! - Explicit `None` rather than silent default

use std::fmt;

use axum::body::Body;
use axum::http::{Method, Request};

use crate::pipeline::context::HandlerContext;
use crate::pipeline::error::ServiceError;
use crate::pipeline::stage::BoxFuture;
use crate::routing::handler::BoxedHandler;
use crate::routing::matcher::{AndMatcher, ExactPathMatcher, Matcher, MethodMatcher, PathPrefixMatcher};

use axum::response::Response;

/// Methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    One(Method),
}

/// Path pattern of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// `/health/db`
    Exact(String),
    /// `/api/auth/*`, stored as the prefix `/api/auth/`
    Wildcard(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix('*') {
            Some(prefix) if prefix.ends_with('/') => PathPattern::Wildcard(prefix.to_string()),
            _ => PathPattern::Exact(pattern.to_string()),
        }
    }

    fn matcher(&self) -> Box<dyn Matcher> {
        match self {
            PathPattern::Exact(path) => Box::new(ExactPathMatcher::new(path.clone())),
            PathPattern::Wildcard(prefix) => Box::new(PathPrefixMatcher::new(prefix.clone())),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Exact(path) => f.write_str(path),
            PathPattern::Wildcard(prefix) => write!(f, "{}*", prefix),
        }
    }
}

/// Documentation attached to a route.
#[derive(Debug, Clone, Default)]
pub struct RouteDoc {
    pub tag: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Name of the declared request body schema, if any.
    pub body_schema: Option<&'static str>,
}

/// A (method filter, path pattern) pair mapped to a handler.
pub struct Route {
    methods: MethodFilter,
    path: PathPattern,
    matcher: AndMatcher,
    handler: BoxedHandler,
    doc: RouteDoc,
}

impl Route {
    pub fn new(methods: MethodFilter, pattern: &str, handler: BoxedHandler) -> Self {
        let path = PathPattern::parse(pattern);
        let mut matchers = vec![path.matcher()];
        if let MethodFilter::One(method) = &methods {
            matchers.push(Box::new(MethodMatcher::new(method.clone())));
        }
        Self {
            methods,
            path,
            matcher: AndMatcher::new(matchers),
            handler,
            doc: RouteDoc::default(),
        }
    }

    pub fn get(pattern: &str, handler: BoxedHandler) -> Self {
        Self::new(MethodFilter::One(Method::GET), pattern, handler)
    }

    pub fn post(pattern: &str, handler: BoxedHandler) -> Self {
        Self::new(MethodFilter::One(Method::POST), pattern, handler)
    }

    /// Accept every method.
    pub fn any(pattern: &str, handler: BoxedHandler) -> Self {
        Self::new(MethodFilter::Any, pattern, handler)
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.doc.tag = Some(tag.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.doc.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.doc.description = Some(description.into());
        self
    }

    pub fn body_schema(mut self, schema: &'static str) -> Self {
        self.doc.body_schema = Some(schema);
        self
    }

    pub fn methods(&self) -> &MethodFilter {
        &self.methods
    }

    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    pub fn doc(&self) -> &RouteDoc {
        &self.doc
    }

    pub fn matches(&self, req: &Request<Body>) -> bool {
        self.matcher.matches(req)
    }

    /// Invoke the handler.
    pub fn call(
        &self,
        request: Request<Body>,
        ctx: HandlerContext,
    ) -> BoxFuture<'static, Result<Response, ServiceError>> {
        (self.handler)(request, ctx)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("methods", &self.methods)
            .field("path", &self.path.to_string())
            .finish_non_exhaustive()
    }
}

/// Ordered routes; registration order is match order.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route after all routes registered so far.
    pub fn push(&mut self, route: Route) {
        tracing::debug!(methods = ?route.methods, path = %route.path, "Route registered");
        self.routes.push(route);
    }

    /// Append a group of routes, preserving their order.
    pub fn extend(&mut self, routes: impl IntoIterator<Item = Route>) {
        for route in routes {
            self.push(route);
        }
    }

    /// The first route matching the request, if any.
    pub fn find(&self, req: &Request<Body>) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(req))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

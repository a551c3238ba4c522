//! Cross-origin policy stage.
//!
//! Requests carrying an `Origin` outside the allow-list are rejected here,
//! before any later stage or route runs. Requests without an `Origin`
//! header (same-origin, server-to-server) pass untouched.
//!
//! Preflight requests (`OPTIONS` + `Access-Control-Request-Method`) from
//! allowed origins are answered with `204 No Content`.

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS,
    ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::CorsConfig;
use crate::pipeline::context::RequestContext;
use crate::pipeline::error::ServiceError;
use crate::pipeline::normalizer::ErrorEnvelope;
use crate::pipeline::stage::{BoxFuture, Flow, Stage};

pub const ORIGIN_NOT_ALLOWED: &str = "Origin not allowed";

const ALLOWED_METHODS: &str = "GET, HEAD, PUT, PATCH, POST, DELETE, OPTIONS";

/// Represents the set of allowed origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Allow any origin (wildcard `*`).
    Any,
    /// Allow specific origins, compared exactly.
    List(Vec<String>),
}

impl AllowedOrigins {
    pub fn from_config(origins: &[String]) -> Self {
        if origins.iter().any(|origin| origin == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins.to_vec())
        }
    }

    /// Checks if an origin is allowed.
    pub fn is_allowed(&self, origin: &str) -> bool {
        match self {
            AllowedOrigins::Any => true,
            AllowedOrigins::List(origins) => origins.iter().any(|allowed| allowed == origin),
        }
    }
}

/// Origin accepted for the current request.
#[derive(Debug, Clone)]
struct AcceptedOrigin(HeaderValue);

#[derive(Debug, Clone)]
pub struct OriginPolicyStage {
    allowed: AllowedOrigins,
    allow_credentials: bool,
    max_age_secs: Option<u64>,
}

impl OriginPolicyStage {
    pub fn new(config: &CorsConfig) -> Self {
        Self {
            allowed: AllowedOrigins::from_config(&config.origins),
            allow_credentials: config.allow_credentials,
            max_age_secs: config.max_age_secs,
        }
    }

    fn preflight(&self, request: &Request<Body>) -> Response {
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        if let Some(requested) = request.headers().get(ACCESS_CONTROL_REQUEST_HEADERS) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        }
        if let Some(max_age) = self.max_age_secs {
            headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
        }
        response
    }
}

fn is_preflight(request: &Request<Body>) -> bool {
    request.method() == Method::OPTIONS
        && request.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

impl Stage for OriginPolicyStage {
    fn name(&self) -> &'static str {
        "origin-policy"
    }

    fn on_request<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: &'a mut Request<Body>,
    ) -> BoxFuture<'a, Result<Flow, ServiceError>> {
        Box::pin(async move {
            let Some(origin) = request.headers().get(ORIGIN).cloned() else {
                return Ok(Flow::Continue);
            };

            let allowed = origin
                .to_str()
                .map(|value| self.allowed.is_allowed(value))
                .unwrap_or(false);
            if !allowed {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    origin = ?origin,
                    path = %ctx.path(),
                    "Rejected request from disallowed origin"
                );
                return Ok(Flow::Respond(
                    ErrorEnvelope::new(ORIGIN_NOT_ALLOWED).into_response_with(StatusCode::FORBIDDEN),
                ));
            }

            ctx.extensions_mut().insert(AcceptedOrigin(origin));
            if is_preflight(request) {
                return Ok(Flow::Respond(self.preflight(request)));
            }
            Ok(Flow::Continue)
        })
    }

    fn on_response(&self, ctx: &RequestContext, response: &mut Response) {
        let Some(AcceptedOrigin(origin)) = ctx.extensions().get::<AcceptedOrigin>() else {
            return;
        };

        let value = match (&self.allowed, self.allow_credentials) {
            (AllowedOrigins::Any, false) => HeaderValue::from_static("*"),
            _ => origin.clone(),
        };
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        if self.allow_credentials {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
}

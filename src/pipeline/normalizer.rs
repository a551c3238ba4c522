//! Error normalization.
//!
//! Every failure that escapes a stage, the route table, or a handler is
//! caught here exactly once and mapped to one envelope:
//!
//! ```text
//! NotFound     → 404 {"error":"Route not found"}
//! Validation   → 400 {"error":"Validation error","details":"..."}
//! anything else→ 500 {"error":"Internal server error"}
//! ```
//!
//! The cause of a 500 is logged but never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::pipeline::context::RequestContext;
use crate::pipeline::error::{ErrorKind, ServiceError};

pub const ROUTE_NOT_FOUND: &str = "Route not found";
pub const VALIDATION_ERROR: &str = "Validation error";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// The client-facing error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Render with the given status as a JSON response.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Terminal error mapper wrapped around the whole pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorNormalizer;

impl ErrorNormalizer {
    /// Map a failure to its status code and envelope. First match wins.
    pub fn classify(&self, error: &ServiceError) -> (StatusCode, ErrorEnvelope) {
        match error.kind() {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, ErrorEnvelope::new(ROUTE_NOT_FOUND)),
            ErrorKind::Validation => (
                StatusCode::BAD_REQUEST,
                ErrorEnvelope::new(VALIDATION_ERROR).with_details(error.to_string()),
            ),
            ErrorKind::Unclassified => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorEnvelope::new(INTERNAL_SERVER_ERROR),
            ),
        }
    }

    /// Log the failure and produce the single response sent for it.
    pub fn respond(&self, ctx: &RequestContext, error: ServiceError) -> Response {
        let (status, envelope) = self.classify(&error);
        match error.kind() {
            ErrorKind::Unclassified => tracing::error!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                error = %error,
                "Unhandled error"
            ),
            _ => tracing::debug!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                error = %error,
                status = status.as_u16(),
                "Request rejected"
            ),
        }
        envelope.into_response_with(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceError;
    use axum::http::Method;

    #[test]
    fn test_not_found_envelope() {
        let (status, envelope) = ErrorNormalizer.classify(&ServiceError::NotFound {
            method: Method::GET,
            path: "/nope".to_string(),
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(envelope, ErrorEnvelope::new("Route not found"));
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"error":"Route not found"}"#
        );
    }

    #[test]
    fn test_validation_envelope_carries_details() {
        let (status, envelope) = ErrorNormalizer
            .classify(&ServiceError::Validation("missing field `email`".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.error, "Validation error");
        assert_eq!(envelope.details.as_deref(), Some("missing field `email`"));
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let errors = [
            ServiceError::Internal("secret dsn postgres://admin:pw@db".to_string()),
            ServiceError::Resource(ResourceError::Unavailable("pool exhausted".to_string())),
            ServiceError::Panic("index out of bounds".to_string()),
            ServiceError::Delegate("auth exploded".into()),
        ];
        for error in &errors {
            let (status, envelope) = ErrorNormalizer.classify(error);
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(envelope, ErrorEnvelope::new("Internal server error"));
        }
    }
}

//! Failures raised inside the pipeline.

use axum::http::Method;
use thiserror::Error;

use crate::resources::ResourceError;

/// Boxed error used at opaque boundaries (the auth delegate).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Any failure escaping a stage, the route table, or a handler.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no route matches {method} {path}")]
    NotFound { method: Method, path: String },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("auth delegate failed: {0}")]
    Delegate(#[source] BoxError),

    #[error("handler panicked: {0}")]
    Panic(String),

    #[error("{0}")]
    Internal(String),
}

/// The closed set of failure classes the client can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unclassified,
}

impl ServiceError {
    /// Classify the failure. Anything not explicitly recognised is unclassified.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Unclassified,
        }
    }
}

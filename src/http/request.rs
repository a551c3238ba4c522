//! Request identification.
//!
//! The request ID is assigned by the `SetRequestIdLayer` in front of the
//! pipeline, or taken from the client's own `x-request-id` header, and is
//! echoed back on the response.

use axum::http::{HeaderMap, HeaderName};

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The request ID carried in `headers`, if present and printable.
pub fn request_id_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

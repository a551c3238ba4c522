//! Schema-declared request bodies.
//!
//! A route that declares a body type gets its JSON parsed and checked with
//! `validator` before the handler runs. Malformed JSON, missing required
//! fields, and rule violations all become validation failures.

use std::future::Future;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::pipeline::context::HandlerContext;
use crate::pipeline::error::ServiceError;
use crate::routing::handler::{handler_fn, BoxedHandler};

/// Largest request body accepted by schema-validated routes.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Read the request body as JSON of type `T` and run its validation rules.
pub async fn validated_json<T>(request: Request<Body>) -> Result<T, ServiceError>
where
    T: DeserializeOwned + Validate,
{
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ServiceError::Validation(format!("unreadable body: {}", e)))?;

    if bytes.is_empty() {
        return Err(ServiceError::Validation("request body is required".to_string()));
    }

    let value: T = serde_json::from_slice(&bytes)
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    value
        .validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    Ok(value)
}

/// Build a handler whose body must satisfy schema `T`.
pub fn json_handler<T, F, Fut>(f: F) -> BoxedHandler
where
    T: DeserializeOwned + Validate + Send + 'static,
    F: Fn(T, HandlerContext) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, ServiceError>> + Send + 'static,
{
    handler_fn(move |request, ctx| {
        let f = f.clone();
        async move {
            let body = validated_json::<T>(request).await?;
            f(body, ctx).await
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct SignUp {
        #[validate(email)]
        email: String,
        #[validate(length(min = 8))]
        password: String,
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_is_parsed() {
        let body: SignUp = validated_json(json_request(
            r#"{"email":"a@example.com","password":"hunter222"}"#,
        ))
        .await
        .unwrap();
        assert_eq!(body.email, "a@example.com");
        assert_eq!(body.password.len(), 9);
    }

    #[tokio::test]
    async fn test_missing_field_is_a_validation_error() {
        let err = validated_json::<SignUp>(json_request(r#"{"email":"a@example.com"}"#))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(details) => assert!(details.contains("password")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rule_violation_is_a_validation_error() {
        let err = validated_json::<SignUp>(json_request(
            r#"{"email":"not-an-email","password":"short"}"#,
        ))
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref d) if !d.is_empty()));
    }

    #[tokio::test]
    async fn test_empty_body_is_a_validation_error() {
        let err = validated_json::<SignUp>(json_request("")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}

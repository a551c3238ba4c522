//! Authentication delegate boundary.
//!
//! Everything under the auth prefix is handed to an [`AuthDelegate`]
//! without inspection: method, path, query, headers and body go in
//! unchanged and the delegate's response comes back unchanged. Delegate
//! failures surface as unclassified errors.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Request, Uri, Version};
use axum::response::Response;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::pipeline::error::{BoxError, ServiceError};
use crate::pipeline::stage::BoxFuture;
use crate::routing::{handler_fn, Route};

pub const TAG: &str = "auth";

type DelegateFn = dyn Fn(Request<Body>) -> BoxFuture<'static, Result<Response, BoxError>> + Send + Sync;

/// Opaque request → response capability for the auth subsystem.
#[derive(Clone)]
pub struct AuthDelegate {
    inner: Arc<DelegateFn>,
}

impl AuthDelegate {
    /// Wrap an async function.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, BoxError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |request| Box::pin(f(request))),
        }
    }

    /// Forward to an external auth service. Only the scheme and authority
    /// of `base` are used; the request keeps its own path and query.
    pub fn upstream(base: &Url) -> Result<Self, BoxError> {
        let forwarder = Arc::new(UpstreamForwarder::new(base)?);
        tracing::info!(upstream = %forwarder.authority, "Auth delegate forwarding upstream");
        Ok(Self::from_fn(move |request| {
            let forwarder = Arc::clone(&forwarder);
            async move { forwarder.forward(request).await }
        }))
    }

    pub async fn forward(&self, request: Request<Body>) -> Result<Response, BoxError> {
        (self.inner)(request).await
    }
}

impl std::fmt::Debug for AuthDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthDelegate").finish_non_exhaustive()
    }
}

struct UpstreamForwarder {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
}

impl UpstreamForwarder {
    fn new(base: &Url) -> Result<Self, BoxError> {
        let host = base
            .host_str()
            .ok_or_else(|| format!("auth upstream {} has no host", base))?;
        let authority = match base.port_or_known_default() {
            Some(port) => Authority::from_str(&format!("{}:{}", host, port))?,
            None => Authority::from_str(host)?,
        };
        let scheme = Scheme::from_str(base.scheme())?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            scheme,
            authority,
        })
    }

    fn rewrite(&self, uri: &Uri) -> Result<Uri, BoxError> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Ok(Uri::from_parts(parts)?)
    }

    async fn forward(&self, request: Request<Body>) -> Result<Response, BoxError> {
        let (mut parts, body) = request.into_parts();
        parts.uri = self.rewrite(&parts.uri)?;
        parts.version = Version::HTTP_11;

        let response: hyper::Response<hyper::body::Incoming> = self
            .client
            .request(Request::from_parts(parts, body))
            .await?;
        Ok(response.map(Body::new))
    }
}

/// `ANY {prefix}/*`, answered by `delegate`.
pub fn auth_routes(prefix: &str, delegate: AuthDelegate) -> Vec<Route> {
    let pattern = format!("{}/*", prefix.trim_end_matches('/'));
    let route = Route::any(
        &pattern,
        handler_fn(move |request, _| {
            let delegate = delegate.clone();
            async move { delegate.forward(request).await.map_err(ServiceError::Delegate) }
        }),
    )
    .tag(TAG)
    .summary("Authentication")
    .description("Sign-up, sign-in, session and sign-out, handled by the auth service");

    vec![route]
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_rewrite_keeps_path_and_query() {
        let base = Url::parse("http://127.0.0.1:3001").unwrap();
        let forwarder = UpstreamForwarder::new(&base).unwrap();
        let uri: Uri = "/api/auth/session?x=1".parse().unwrap();
        assert_eq!(
            forwarder.rewrite(&uri).unwrap().to_string(),
            "http://127.0.0.1:3001/api/auth/session?x=1"
        );
    }

    #[test]
    fn test_known_default_port_is_filled_in() {
        let base = Url::parse("http://auth.internal").unwrap();
        let forwarder = UpstreamForwarder::new(&base).unwrap();
        assert_eq!(forwarder.authority.as_str(), "auth.internal:80");
    }

    #[tokio::test]
    async fn test_route_matches_any_method_under_prefix() {
        let delegate = AuthDelegate::from_fn(|_| async { Ok(StatusCode::ACCEPTED.into_response()) });
        let routes = auth_routes("/api/auth", delegate);
        assert_eq!(routes.len(), 1);

        for method in ["GET", "POST", "DELETE"] {
            let request = Request::builder()
                .method(method)
                .uri("/api/auth/sign-in")
                .body(Body::empty())
                .unwrap();
            assert!(routes[0].matches(&request));
        }
        let outside = Request::builder().uri("/api/other").body(Body::empty()).unwrap();
        assert!(!routes[0].matches(&outside));
    }
}

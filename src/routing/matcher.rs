//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method (single method or any)
//! - Match path exactly or by wildcard prefix
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A single trailing slash is ignored for exact paths
//! - `/prefix/*` matches anything below `/prefix/`
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::{Method, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches one HTTP method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        *req.method() == self.method
    }
}

/// Matches a path exactly, tolerating one trailing slash.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: normalize(&path.into()).to_string(),
        }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        normalize(req.uri().path()) == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().starts_with(&self.prefix)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_method_matcher() {
        let matcher = MethodMatcher::new(Method::GET);
        assert!(matcher.matches(&request(Method::GET, "/health")));
        assert!(!matcher.matches(&request(Method::POST, "/health")));
    }

    #[test]
    fn test_exact_path_matcher() {
        let matcher = ExactPathMatcher::new("/health");
        assert!(matcher.matches(&request(Method::GET, "/health")));
        assert!(matcher.matches(&request(Method::GET, "/health/")));
        assert!(matcher.matches(&request(Method::GET, "http://example.com/health?verbose=1")));
        assert!(!matcher.matches(&request(Method::GET, "/health/db")));
        assert!(!matcher.matches(&request(Method::GET, "/Health")));
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api/auth/");

        assert!(matcher.matches(&request(Method::GET, "http://example.com/api/auth/session")));
        assert!(!matcher.matches(&request(Method::GET, "http://example.com/api/authx")));
    }

    #[test]
    fn test_and_matcher() {
        let matcher = AndMatcher::new(vec![
            Box::new(MethodMatcher::new(Method::GET)),
            Box::new(ExactPathMatcher::new("/health/db")),
        ]);
        assert!(matcher.matches(&request(Method::GET, "/health/db")));
        assert!(!matcher.matches(&request(Method::DELETE, "/health/db")));
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check connection string schemes
//! - Validate value ranges (port > 0, retries >= 1)
//! - Reject contradictory origin policies
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("{field} is not a valid URL: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("{field} has scheme {scheme:?}, expected one of {expected:?}")]
    UnsupportedScheme {
        field: &'static str,
        scheme: String,
        expected: &'static [&'static str],
    },

    #[error("cors.origins must not be empty")]
    EmptyOrigins,

    #[error("cors.origins mixes \"*\" with explicit origins")]
    MixedWildcard,

    #[error("{field} must start with '/': {value:?}")]
    InvalidPrefix { field: &'static str, value: String },

    #[error("cache.max_retries_per_request must be at least 1")]
    ZeroRetries,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("cache.backoff_cap_ms ({cap}) is below cache.backoff_step_ms ({step})")]
    CapBelowStep { step: u64, cap: u64 },
}

const DATABASE_SCHEMES: &[&str] = &["postgres", "postgresql"];
const CACHE_SCHEMES: &[&str] = &["redis", "rediss"];
const UPSTREAM_SCHEMES: &[&str] = &["http"];

/// Validate a loaded configuration, collecting every error.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    check_url(&mut errors, "database.url", &config.database.url, DATABASE_SCHEMES);
    check_url(&mut errors, "cache.url", &config.cache.url, CACHE_SCHEMES);
    check_url(
        &mut errors,
        "auth.upstream_url",
        &config.auth.upstream_url,
        UPSTREAM_SCHEMES,
    );

    let origins = &config.cors.origins;
    if origins.is_empty() {
        errors.push(ValidationError::EmptyOrigins);
    } else if origins.len() > 1 && origins.iter().any(|o| o == "*") {
        errors.push(ValidationError::MixedWildcard);
    }

    check_prefix(&mut errors, "static_files.prefix", &config.static_files.prefix);
    check_prefix(&mut errors, "docs.path", &config.docs.path);
    check_prefix(&mut errors, "auth.prefix", &config.auth.prefix);

    if config.cache.max_retries_per_request == 0 {
        errors.push(ValidationError::ZeroRetries);
    }
    if config.cache.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("cache.connect_timeout_ms"));
    }
    if config.cache.response_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("cache.response_timeout_ms"));
    }
    if config.cache.backoff_cap_ms < config.cache.backoff_step_ms {
        errors.push(ValidationError::CapBelowStep {
            step: config.cache.backoff_step_ms,
            cap: config.cache.backoff_cap_ms,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
    expected: &'static [&'static str],
) {
    match Url::parse(value) {
        Ok(url) if expected.contains(&url.scheme()) => {}
        Ok(url) => errors.push(ValidationError::UnsupportedScheme {
            field,
            scheme: url.scheme().to_string(),
            expected,
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            reason: e.to_string(),
        }),
    }
}

fn check_prefix(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') || value.len() < 2 {
        errors.push(ValidationError::InvalidPrefix {
            field,
            value: value.to_string(),
        });
    }
}

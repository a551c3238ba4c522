//! Route groups registered by the service.
//!
//! Registration order is match order: health routes first, then any
//! application routes, then the auth catch-all.

pub mod auth;
pub mod health;

pub use auth::{auth_routes, AuthDelegate};
pub use health::health_routes;

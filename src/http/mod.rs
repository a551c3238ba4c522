//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (request ID lookup)
//!     → pipeline::Service::handle
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id_from, X_REQUEST_ID};
pub use server::HttpServer;

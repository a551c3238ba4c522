//! API documentation subsystem.
//!
//! # Data Flow
//! ```text
//! RouteTable (tags, summaries, body schemas)
//!     → openapi.rs (OpenAPI 3.1 document)
//!     → swagger.rs (viewer page)
//!     → pipeline::stages::docs (served at {path} and {path}/json)
//! ```
//!
//! # Design Decisions
//! - Generated once at startup; the route table never changes afterwards
//! - The viewer is loaded from a CDN, nothing is bundled

pub mod openapi;
pub mod swagger;

pub use openapi::{generate, OpenApi};
pub use swagger::swagger_html;

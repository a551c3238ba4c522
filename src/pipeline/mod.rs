//! Request pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request (from axum fallback)
//!     → service.rs (dispatcher loop)
//!         → stages/origin.rs       (reject disallowed origins, preflight)
//!         → stages/timing.rs       (Server-Timing header)
//!         → stages/docs.rs         (/swagger, /swagger/json)
//!         → stages/static_assets.rs(/uploads/*)
//!         → stages/decorate.rs     (attach database + cache handles)
//!         → routing (first match) → handler
//!     → normalizer.rs on any failure
//!     → stages' on_response in reverse
//!     → HTTP response
//! ```
//!
//! # Design Decisions
//! - Stage order is fixed when the service is built
//! - One dispatcher loop, no nested closures per stage
//! - Failures are rendered in exactly one place

pub mod context;
pub mod error;
pub mod normalizer;
pub mod service;
pub mod stage;
pub mod stages;

pub use context::{HandlerContext, RequestContext};
pub use error::{BoxError, ErrorKind, ServiceError};
pub use normalizer::{ErrorEnvelope, ErrorNormalizer};
pub use service::{Service, ServiceBuilder};
pub use stage::{BoxFuture, Flow, Stage};

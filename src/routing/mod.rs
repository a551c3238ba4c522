//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (scan routes in registration order)
//!     → matcher.rs (evaluate method + path conditions)
//!     → Return: first matched Route or None (→ "Route not found")
//!
//! Route registration (at startup):
//!     health routes → extra routes → auth catch-all
//!     → frozen as an immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod handler;
pub mod matcher;
pub mod router;
pub mod validation;

pub use handler::{handler_fn, BoxedHandler};
pub use router::{MethodFilter, PathPattern, Route, RouteDoc, RouteTable};
pub use validation::{json_handler, validated_json};

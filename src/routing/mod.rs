//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, query)
//!     → router.rs (walk routes in registration order)
//!     → matcher.rs (compiled pattern, named captures)
//!     → defaults filled in
//!     → Return: parameter map (always with controller + action) or RouteNotFound
//!
//! Route compilation (at startup):
//!     RouteConfig[] / append_route / prepend_route
//!     → compile pattern to anchored regex
//!     → freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (registration order, prepends first)

pub mod matcher;
pub mod params;
pub mod router;

pub use matcher::{PatternMatcher, Placeholder, PlaceholderKind};
pub use params::{parse_urlencoded, ParamValue, Parameters};
pub use router::{defaults, DefaultFill, Route, RouteError, Router};

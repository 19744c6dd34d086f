//! Controllers and action resolution.
//!
//! # Data Flow
//! ```text
//! Routed parameters
//!     → spec.rs (class name, short name, action)
//!     → registry.rs (static action table for the class)
//!     → resolver.rs (score candidates with filters.rs)
//!     → chosen ActionDescriptor (action.rs)
//! ```

pub mod action;
pub mod filters;
pub mod registry;
pub mod resolver;
pub mod spec;

pub use action::{Action, ActionDescriptor, ActionError, Handler};
pub use filters::MatchFilter;
pub use registry::{ControllerBuilder, ControllerDescriptor, ControllerRegistry};
pub use resolver::ActionResolver;
pub use spec::{controller_class_name, ControllerSpec};

//! Argument binding.
//!
//! # Data Flow
//! ```text
//! Chosen action's parameter list (param.rs)
//!     → dispatch.rs (raw routed value, or container + binder)
//!     → registry.rs (binder for the parameter type, default otherwise)
//!     → default.rs / view.rs (bind the instance)
//!     → Arguments (args.rs) handed to the action
//! ```

pub mod args;
pub mod default;
pub mod dispatch;
pub mod param;
pub mod registry;
pub mod view;

pub use args::{Argument, Arguments};
pub use default::{overlay_value, DefaultModelBinder};
pub use dispatch::bind_arguments;
pub use param::{NamedType, Param, ParamType, Primitive};
pub use registry::{BindContext, BindError, BindTarget, BinderRegistry, ModelBinder};
pub use view::ViewBinder;

//! MVC dispatch.
//!
//! # Data Flow
//! ```text
//! MvcConfig + controllers + binders + services
//!     → app.rs (explicit build, freeze)
//!     → dispatcher.rs (one handle() per request)
//!     → Response, or a DispatchError (error.rs) for the host
//! ```

pub mod app;
pub mod dispatcher;
pub mod error;

pub use app::{HomeDir, MvcApp, MvcAppBuilder};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchStage};

//! MVC request dispatch core.
//!
//! Maps an HTTP request to a controller action, binds the action's
//! arguments and turns its result into a response.

// Core subsystems
pub mod binding;
pub mod controller;
pub mod mvc;
pub mod routing;

// Collaborators
pub mod container;
pub mod model;
pub mod view;

// Host and cross-cutting concerns
pub mod config;
pub mod http;
pub mod observability;

pub use config::MvcConfig;
pub use http::{DispatchRequest, HttpServer};
pub use mvc::{DispatchError, Dispatcher, MvcApp};

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MvcConfig (validated, immutable)
//!     → consumed once by MvcApp::builder at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; routes and registries are frozen from it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::DispatchConfig;
pub use schema::MvcConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
pub use schema::RouteParameters;
pub use schema::ServerConfig;
pub use schema::ViewConfig;
pub use validation::ValidationError;

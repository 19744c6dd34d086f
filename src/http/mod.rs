//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → request.rs (collect body, build DispatchRequest)
//!     → Dispatcher::handle
//!     → response.rs (action output → Response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{BodyError, DispatchRequest, MakeRequestUuid, X_REQUEST_ID};
pub use response::normalize;
pub use server::HttpServer;

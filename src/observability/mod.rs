//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and HTTP layers produce:
//!     → logging.rs (structured tracing events, one `dispatch` span per request)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the HTTP layer into the dispatch span
//! - Metrics are cheap (no-ops without a recorder)

pub mod logging;
pub mod metrics;

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway and table controller produce:
//!     → logging.rs (structured tracing events, EnvFilter)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape (optional)
//! ```
//!
//! The request id flows through every gateway log line.

pub mod logging;
pub mod metrics;

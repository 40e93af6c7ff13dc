//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler and startup produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings
//! - Request ID flows through the request span
//! - Every request logs method, URI, status and elapsed time

pub mod logging;
pub mod metrics;

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per cycle)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (name, endpoint, cycle_id) rather than formatted strings
//! - Metrics are cheap (atomic increments); recording is a no-op without an exporter

pub mod logging;
pub mod metrics;

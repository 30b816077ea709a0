//! Reconciliation driver.
//!
//! # Data Flow
//! ```text
//! ticker (cycle_interval, overruns start the next cycle at once)
//!     → driver.rs: list A records per zone → keep pool members → dedupe names
//!     → FailoverEngine::evaluate per name (bounded concurrency, listing order)
//!     → report.rs: partition outcomes → changes batch, status batch
//!     → Notifier
//! ```
//!
//! # Design Decisions
//! - Cycles never overlap
//! - A zone that fails to list is skipped; the other zones still run
//! - Notification failures never affect state

pub mod driver;
pub mod report;

pub use driver::Reconciler;
pub use report::CycleReport;

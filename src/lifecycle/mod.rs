//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Credentials → Clients → State store → Engine → Reconciler
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → reconciler finishes its cycle → admin server stops → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then clients and state, then loops
//! - Any startup error is fatal; nothing is retried
//! - An in-flight cycle is never interrupted

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build, build_with_prober, Daemon, StartupError};

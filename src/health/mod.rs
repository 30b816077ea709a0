//! Reachability probing subsystem.
//!
//! # Data Flow
//! ```text
//! Failover engine asks about one endpoint
//!     → probe.rs (Prober trait, SystemProber)
//!         → latency: ping.rs (one ICMP echo) or TCP connect time
//!         → connectivity: TCP connect to the endpoint port
//!     → Option<Duration> / bool back to the engine
//! ```
//!
//! # Design Decisions
//! - Probes hold no state; the engine owns the counters
//! - Every probe has a hard deadline
//! - Timeouts, refusals and unreachable hosts all collapse to a failed probe

pub mod ping;
pub mod probe;

pub use probe::{ProbeKind, Prober, SystemProber};

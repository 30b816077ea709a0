//! Per-name health evaluation and failover.
//!
//! # Data Flow
//! ```text
//! Assignment{zone, record_id, name, endpoint}
//!     → engine.rs (lock name, load or seed state, follow external DNS changes)
//!     → latency probe → connectivity probe → counters (state.rs)
//!     → persist counters
//!     → counter exhausted? → first healthy alternate → DNS write → persist
//!     → on an alternate? → revert confirmation → DNS write → persist
//!     → Vec<Outcome> (outcome.rs) for the notification batch
//! ```

pub mod engine;
pub mod outcome;
pub mod state;

pub use engine::{Assignment, EngineSettings, Evaluation, FailoverEngine};
pub use outcome::{DnsAction, Outcome};
pub use state::EndpointState;

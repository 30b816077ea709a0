//! Candidate endpoint pool.
//!
//! # Data Flow
//! ```text
//! [[pool]] entries in config (ordered)
//!     → directory.rs (CandidatePool, immutable after startup)
//!     → reconcile: filter DNS records to pool members
//!     → failover: scan alternates in pool order
//! ```
//!
//! # Design Decisions
//! - Pool order is significant: the first healthy alternate wins
//! - Addresses are unique within the pool, so an IP maps to exactly one endpoint
//! - The pool is shared read-only via Arc

pub mod directory;
pub mod endpoint;

pub use directory::CandidatePool;
pub use endpoint::Endpoint;

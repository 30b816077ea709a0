//! Durable per-name state.
//!
//! # Data Flow
//! ```text
//! startup: state file → file.rs (load, or start empty) → in-memory map
//! evaluate(name):
//!     → locks.rs (per-name mutex, held for the whole evaluation)
//!     → get(name) → mutate copy → put(state)
//!         → serialize full map → temp file → rename → update in-memory map
//! ```
//!
//! # Design Decisions
//! - The in-memory map only changes after the durable write succeeded
//! - Writes of the same name are serialized by NameLocks; different names interleave freely
//! - Entries are never deleted

pub mod file;
pub mod locks;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use crate::failover::EndpointState;

pub use file::FileStateStore;
pub use locks::NameLocks;
pub use memory::MemoryStateStore;

/// Errors while persisting state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Name → EndpointState mapping that survives restarts.
#[async_trait]
pub trait StateStore: Send + Sync {
    fn get(&self, name: &str) -> Option<EndpointState>;

    /// Durably record `state`. On error the previous value stays visible.
    async fn put(&self, state: EndpointState) -> Result<(), StoreError>;

    /// Every known state, ordered by name.
    fn snapshot(&self) -> Vec<EndpointState>;
}

//! DNS record store subsystem.
//!
//! # Data Flow
//! ```text
//! Reconciler
//!     → list_a_records(zone) → [ARecord{id, name, ip}]
//! Failover engine
//!     → set_a_record(zone, id, name, ip) on switch / revert / rollback
//! ```
//!
//! # Design Decisions
//! - Only A records are read or written
//! - No automatic retry; a failed write is re-attempted by the next cycle
//! - Every request carries a timeout

pub mod cloudflare;

use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;

pub use cloudflare::CloudflareClient;

/// An A record as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ARecord {
    pub id: String,
    pub name: String,
    pub ip: IpAddr,
}

/// Errors talking to the DNS provider.
#[derive(Debug, Error)]
pub enum DnsError {
    /// Connection failure, timeout or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response reporting `success: false`.
    #[error("API error: {0}")]
    Api(String),
}

/// A zone-scoped store of A records.
#[async_trait]
pub trait DnsRecordStore: Send + Sync {
    async fn list_a_records(&self, zone: &str) -> Result<Vec<ARecord>, DnsError>;

    async fn set_a_record(&self, zone: &str, record_id: &str, name: &str, ip: IpAddr) -> Result<(), DnsError>;
}

//! Ordered candidate pool.
//!
//! # Responsibilities
//! - Hold the configured endpoints in their configured order
//! - Map a DNS record IP back to its pool endpoint (and probe port)
//! - Enumerate failover alternates for a name

use std::net::IpAddr;
use crate::config::PoolEntry;
use crate::pool::endpoint::Endpoint;

/// The fixed, ordered list of endpoints eligible to serve a name.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    endpoints: Vec<Endpoint>,
}

impl CandidatePool {
    /// Build the pool from configuration entries, keeping their order.
    ///
    /// Duplicate addresses are skipped after the first occurrence; config
    /// validation rejects them before we get here.
    pub fn from_config(entries: &[PoolEntry]) -> Self {
        let mut endpoints: Vec<Endpoint> = Vec::with_capacity(entries.len());
        for entry in entries {
            if endpoints.iter().any(|e| e.address == entry.address) {
                tracing::warn!(address = %entry.address, "Duplicate pool address ignored");
                continue;
            }
            endpoints.push(Endpoint::new(entry.address, entry.port));
        }
        Self { endpoints }
    }

    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }

    /// Look up the pool endpoint serving `address`.
    pub fn find(&self, address: IpAddr) -> Option<Endpoint> {
        self.endpoints.iter().find(|e| e.address == address).copied()
    }

    pub fn contains(&self, address: IpAddr) -> bool {
        self.find(address).is_some()
    }

    /// Failover candidates in pool order, skipping the name's original
    /// endpoint and the alternate it is already on.
    pub fn alternates(
        &self,
        original: Endpoint,
        active: Option<Endpoint>,
    ) -> impl Iterator<Item = Endpoint> + '_ {
        self.endpoints
            .iter()
            .copied()
            .filter(move |e| e.address != original.address)
            .filter(move |e| active.map_or(true, |a| a.address != e.address))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

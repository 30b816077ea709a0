//! Per-name failover state.
//!
//! # State Transitions
//! ```text
//! On original ──(counter reaches max_attempts, alternate found)──▶ On alternate
//! On alternate ──(revert_probe_count latency + connectivity passes)──▶ On original
//! ```
//!
//! # Design Decisions
//! - Counters are per probe kind and independent
//! - Counters saturate at max_attempts so a stuck name re-attempts every cycle
//! - Counters describe the currently-assigned endpoint and reset when it changes

use serde::{Deserialize, Serialize};
use crate::pool::Endpoint;

/// Durable failover state of one DNS name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointState {
    pub name: String,

    /// Where the name points under normal operation. Seeded on first sighting.
    pub original_endpoint: Endpoint,

    /// Alternate the name currently points at; `None` means the original.
    #[serde(default)]
    pub active_endpoint: Option<Endpoint>,

    #[serde(default)]
    pub latency_failures: u32,

    #[serde(default)]
    pub connectivity_failures: u32,

    /// Whether the most recent failover has been reverted.
    #[serde(default)]
    pub restored: bool,

    /// Unix seconds of the last switch or revert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition: Option<u64>,
}

impl EndpointState {
    /// State for a name seen for the first time, pointing at `reported`.
    pub fn seed(name: impl Into<String>, reported: Endpoint) -> Self {
        Self {
            name: name.into(),
            original_endpoint: reported,
            active_endpoint: None,
            latency_failures: 0,
            connectivity_failures: 0,
            restored: false,
            last_transition: None,
        }
    }

    /// Endpoint DNS is believed to point at.
    pub fn current_endpoint(&self) -> Endpoint {
        self.active_endpoint.unwrap_or(self.original_endpoint)
    }

    /// A switch happened and has not been reverted yet.
    pub fn has_pending_failover(&self) -> bool {
        self.active_endpoint.is_some() && !self.restored
    }

    pub fn reset_counters(&mut self) {
        self.latency_failures = 0;
        self.connectivity_failures = 0;
    }

    /// Record that DNS now points at `target`.
    pub fn point_at(&mut self, target: Endpoint, now: u64) {
        if target.address == self.original_endpoint.address {
            self.active_endpoint = None;
            self.restored = true;
        } else {
            self.active_endpoint = Some(target);
            self.restored = false;
        }
        self.reset_counters();
        self.last_transition = Some(now);
    }
}

/// Count one failure, saturating at `max`. Returns true when exhausted.
pub fn count_failure(counter: &mut u32, max: u32) -> bool {
    *counter = counter.saturating_add(1).min(max);
    *counter >= max
}

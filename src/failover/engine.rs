//! Failover decision engine.
//!
//! # Responsibilities
//! - Turn probe results into per-name failure counters
//! - Switch a name to the first healthy alternate once a counter is exhausted
//! - Revert to the original endpoint after sustained recovery evidence
//! - Keep DNS and durable state from diverging
//!
//! # Design Decisions
//! - One evaluation per name at a time (NameLocks); names run in parallel
//! - Counters are persisted before any DNS write is attempted
//! - A transition whose state cannot be persisted is rolled back in DNS
//! - Revert confirmation sleeps asynchronously, so it only delays its own name

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use crate::config::{FailoverConfig, ProbeConfig};
use crate::dns::DnsRecordStore;
use crate::failover::outcome::{DnsAction, Outcome};
use crate::failover::state::{count_failure, EndpointState};
use crate::health::{ProbeKind, Prober};
use crate::observability::metrics;
use crate::pool::{CandidatePool, Endpoint};
use crate::store::{NameLocks, StateStore};

/// Thresholds the engine decides with.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub max_attempts: u32,
    pub revert_probe_count: u32,
    pub revert_probe_spacing: Duration,
}

impl EngineSettings {
    pub fn from_config(failover: &FailoverConfig, probe: &ProbeConfig) -> Self {
        Self {
            max_attempts: failover.max_attempts,
            revert_probe_count: probe.revert_probe_count,
            revert_probe_spacing: probe.revert_probe_spacing(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&FailoverConfig::default(), &ProbeConfig::default())
    }
}

/// Where a name points according to the DNS store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub zone: String,
    pub record_id: String,
    pub name: String,
    pub endpoint: Endpoint,
}

/// Result of evaluating one name.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Durable state after the evaluation; `None` if the name was never persisted.
    pub state: Option<EndpointState>,
    pub outcomes: Vec<Outcome>,
}

pub struct FailoverEngine {
    pool: Arc<CandidatePool>,
    prober: Arc<dyn Prober>,
    dns: Arc<dyn DnsRecordStore>,
    store: Arc<dyn StateStore>,
    locks: NameLocks,
    settings: EngineSettings,
}

impl FailoverEngine {
    pub fn new(
        pool: Arc<CandidatePool>,
        prober: Arc<dyn Prober>,
        dns: Arc<dyn DnsRecordStore>,
        store: Arc<dyn StateStore>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            pool,
            prober,
            dns,
            store,
            locks: NameLocks::new(),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Probe the endpoint `assignment` points at, update counters, and switch
    /// or revert when a threshold is met.
    pub async fn evaluate(&self, assignment: &Assignment, now: SystemTime) -> Evaluation {
        let _guard = self.locks.acquire(&assignment.name).await;
        let now = unix_secs(now);
        let name = assignment.name.as_str();
        let reported = assignment.endpoint;
        let mut outcomes = Vec::new();

        let mut state = match self.store.get(name) {
            Some(state) => state,
            None => {
                tracing::info!(name, endpoint = %reported, "New name, recording original endpoint");
                EndpointState::seed(name, reported)
            }
        };
        if let Some(current) = self.pool.find(state.original_endpoint.address) {
            state.original_endpoint = current;
        }
        follow_dns(&mut state, reported, now);

        let exhausted = self.check_health(&mut state, reported, &mut outcomes).await;

        if let Err(e) = self.store.put(state.clone()).await {
            metrics::record_upstream_error("store");
            tracing::error!(name, error = %e, "Failed to persist probe counters");
            outcomes.push(Outcome::Fatal {
                name: name.to_string(),
                error: e.to_string(),
            });
            return Evaluation {
                state: self.store.get(name),
                outcomes,
            };
        }

        if let Some(reason) = exhausted {
            self.fail_over(assignment, &mut state, reason, now, &mut outcomes).await;
        }

        if state.active_endpoint.is_some() {
            self.try_revert(assignment, &mut state, now, &mut outcomes).await;
        }

        Evaluation {
            state: Some(state),
            outcomes,
        }
    }

    /// Latency first, then connectivity. Returns the probe kind whose counter
    /// is exhausted, if any.
    async fn check_health(
        &self,
        state: &mut EndpointState,
        endpoint: Endpoint,
        outcomes: &mut Vec<Outcome>,
    ) -> Option<ProbeKind> {
        let max = self.settings.max_attempts;

        let Some(latency) = self.prober.latency(endpoint).await else {
            if count_failure(&mut state.latency_failures, max) {
                return Some(ProbeKind::Latency);
            }
            tracing::warn!(name = %state.name, %endpoint, attempt = state.latency_failures, max, "Latency probe failed");
            outcomes.push(Outcome::Warning {
                name: state.name.clone(),
                endpoint,
                probe: ProbeKind::Latency,
                attempt: state.latency_failures,
                max_attempts: max,
                latency: None,
            });
            return None;
        };
        state.latency_failures = 0;

        if self.prober.connectivity(endpoint).await {
            state.connectivity_failures = 0;
            outcomes.push(Outcome::Healthy {
                name: state.name.clone(),
                endpoint,
                latency,
            });
            return None;
        }

        if count_failure(&mut state.connectivity_failures, max) {
            return Some(ProbeKind::Connectivity);
        }
        tracing::warn!(name = %state.name, %endpoint, attempt = state.connectivity_failures, max, "Connectivity probe failed");
        outcomes.push(Outcome::Warning {
            name: state.name.clone(),
            endpoint,
            probe: ProbeKind::Connectivity,
            attempt: state.connectivity_failures,
            max_attempts: max,
            latency: Some(latency),
        });
        None
    }

    async fn fail_over(
        &self,
        assignment: &Assignment,
        state: &mut EndpointState,
        reason: ProbeKind,
        now: u64,
        outcomes: &mut Vec<Outcome>,
    ) {
        let name = assignment.name.as_str();

        if state.has_pending_failover() {
            tracing::warn!(
                name,
                endpoint = %assignment.endpoint,
                original = %state.original_endpoint,
                probe = %reason,
                "Alternate degraded while failover pending, not switching again"
            );
            outcomes.push(Outcome::FailoverPending {
                name: name.to_string(),
                endpoint: assignment.endpoint,
                original: state.original_endpoint,
                reason,
            });
            return;
        }

        let Some(alternate) = self.find_alternate(state).await else {
            tracing::warn!(name, endpoint = %assignment.endpoint, probe = %reason, "No healthy alternate endpoint");
            outcomes.push(Outcome::NoAlternative {
                name: name.to_string(),
                endpoint: assignment.endpoint,
                reason,
                max_attempts: self.settings.max_attempts,
            });
            return;
        };

        let previous = state.clone();
        if let Err(e) = self
            .dns
            .set_a_record(&assignment.zone, &assignment.record_id, name, alternate.address)
            .await
        {
            metrics::record_upstream_error("dns");
            tracing::error!(name, to = %alternate, error = %e, "DNS switch failed");
            outcomes.push(Outcome::UpstreamError {
                name: name.to_string(),
                action: DnsAction::Switch,
                error: e.to_string(),
            });
            return;
        }

        state.point_at(alternate, now);
        if self.commit_transition(assignment, state, previous, outcomes).await {
            metrics::record_transition("switch");
            tracing::info!(name, from = %assignment.endpoint, to = %alternate, probe = %reason, "Switched to alternate endpoint");
            outcomes.push(Outcome::Switched {
                name: name.to_string(),
                from: assignment.endpoint,
                to: alternate,
                reason,
            });
        }
    }

    /// First alternate in pool order that answers a fresh latency probe.
    async fn find_alternate(&self, state: &EndpointState) -> Option<Endpoint> {
        for candidate in self.pool.alternates(state.original_endpoint, state.active_endpoint) {
            if let Some(rtt) = self.prober.latency(candidate).await {
                tracing::debug!(name = %state.name, %candidate, rtt_ms = rtt.as_millis() as u64, "Alternate candidate healthy");
                return Some(candidate);
            }
        }
        None
    }

    /// Revert once the original passes every latency probe and then every
    /// connectivity probe in one uninterrupted sequence.
    async fn try_revert(
        &self,
        assignment: &Assignment,
        state: &mut EndpointState,
        now: u64,
        outcomes: &mut Vec<Outcome>,
    ) {
        let name = assignment.name.as_str();
        let original = state.original_endpoint;
        let count = self.settings.revert_probe_count;

        let mut probes = 0;
        for kind in [ProbeKind::Latency, ProbeKind::Connectivity] {
            for passed in 0..count {
                if probes > 0 {
                    tokio::time::sleep(self.settings.revert_probe_spacing).await;
                }
                probes += 1;

                let ok = match kind {
                    ProbeKind::Latency => self.prober.latency(original).await.is_some(),
                    ProbeKind::Connectivity => self.prober.connectivity(original).await,
                };
                if !ok {
                    tracing::debug!(name, %original, probe = %kind, passed, "Original endpoint not recovered yet");
                    return;
                }
            }
        }

        let Some(active) = state.active_endpoint else {
            return;
        };
        if let Err(e) = self
            .dns
            .set_a_record(&assignment.zone, &assignment.record_id, name, original.address)
            .await
        {
            metrics::record_upstream_error("dns");
            tracing::error!(name, to = %original, error = %e, "DNS revert failed");
            outcomes.push(Outcome::UpstreamError {
                name: name.to_string(),
                action: DnsAction::Revert,
                error: e.to_string(),
            });
            return;
        }

        let previous = state.clone();
        state.point_at(original, now);
        if self.commit_transition(assignment, state, previous, outcomes).await {
            metrics::record_transition("revert");
            tracing::info!(name, from = %active, to = %original, "Reverted to original endpoint");
            outcomes.push(Outcome::Reverted {
                name: name.to_string(),
                endpoint: original,
                checks: count,
            });
        }
    }

    /// Persist a transition that DNS already reflects. On failure, point DNS
    /// back at `previous` and restore it in memory. Returns whether the
    /// transition stands.
    async fn commit_transition(
        &self,
        assignment: &Assignment,
        state: &mut EndpointState,
        previous: EndpointState,
        outcomes: &mut Vec<Outcome>,
    ) -> bool {
        let name = assignment.name.as_str();
        let Err(e) = self.store.put(state.clone()).await else {
            return true;
        };

        metrics::record_upstream_error("store");
        let rollback_to = previous.current_endpoint();
        tracing::error!(name, error = %e, rollback_to = %rollback_to, "Failed to persist transition, rolling back DNS");

        if let Err(dns_err) = self
            .dns
            .set_a_record(&assignment.zone, &assignment.record_id, name, rollback_to.address)
            .await
        {
            metrics::record_upstream_error("dns");
            tracing::error!(name, error = %dns_err, "DNS rollback failed; DNS and state diverge");
            outcomes.push(Outcome::UpstreamError {
                name: name.to_string(),
                action: DnsAction::Rollback,
                error: dns_err.to_string(),
            });
        }

        *state = previous;
        outcomes.push(Outcome::Fatal {
            name: name.to_string(),
            error: e.to_string(),
        });
        false
    }
}

/// Make the stored view match what DNS reports.
fn follow_dns(state: &mut EndpointState, reported: Endpoint, now: u64) {
    let expected = state.current_endpoint();
    if expected.address == reported.address {
        return;
    }
    tracing::warn!(
        name = %state.name,
        %expected,
        %reported,
        "DNS changed outside the failover engine, following it"
    );
    state.point_at(reported, now);
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

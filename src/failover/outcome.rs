//! Evaluation outcomes and their operator-facing text.

use std::fmt;
use std::time::Duration;
use crate::health::ProbeKind;
use crate::pool::Endpoint;

/// DNS write that failed upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsAction {
    Switch,
    Revert,
    /// Undoing a DNS write whose state could not be persisted.
    Rollback,
}

impl fmt::Display for DnsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DnsAction::Switch => "switch",
            DnsAction::Revert => "revert",
            DnsAction::Rollback => "rollback",
        })
    }
}

/// One thing that happened while evaluating a name.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Both probes passed.
    Healthy {
        name: String,
        endpoint: Endpoint,
        latency: Duration,
    },
    /// A probe failed but the threshold is not reached yet.
    Warning {
        name: String,
        endpoint: Endpoint,
        probe: ProbeKind,
        attempt: u32,
        max_attempts: u32,
        latency: Option<Duration>,
    },
    Switched {
        name: String,
        from: Endpoint,
        to: Endpoint,
        reason: ProbeKind,
    },
    /// Threshold reached, but no alternate passed a latency probe.
    NoAlternative {
        name: String,
        endpoint: Endpoint,
        reason: ProbeKind,
        max_attempts: u32,
    },
    /// Threshold reached on an alternate while a failover is already pending.
    FailoverPending {
        name: String,
        endpoint: Endpoint,
        original: Endpoint,
        reason: ProbeKind,
    },
    Reverted {
        name: String,
        endpoint: Endpoint,
        checks: u32,
    },
    /// The DNS store rejected a write; retried next cycle.
    UpstreamError {
        name: String,
        action: DnsAction,
        error: String,
    },
    /// State could not be made durable.
    Fatal {
        name: String,
        error: String,
    },
}

impl Outcome {
    pub fn name(&self) -> &str {
        match self {
            Outcome::Healthy { name, .. }
            | Outcome::Warning { name, .. }
            | Outcome::Switched { name, .. }
            | Outcome::NoAlternative { name, .. }
            | Outcome::FailoverPending { name, .. }
            | Outcome::Reverted { name, .. }
            | Outcome::UpstreamError { name, .. }
            | Outcome::Fatal { name, .. } => name,
        }
    }

    /// Belongs in the "state changed" batch rather than routine status.
    pub fn is_state_change(&self) -> bool {
        !matches!(self, Outcome::Healthy { .. } | Outcome::Warning { .. })
    }
}

fn ms(d: Duration) -> String {
    format!("{:.2}", d.as_secs_f64() * 1000.0)
}

fn probe_label(kind: ProbeKind) -> &'static str {
    match kind {
        ProbeKind::Latency => "Ping",
        ProbeKind::Connectivity => "TCP",
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Healthy { name, endpoint, latency } => write!(
                f,
                "✅ {name} (IP: {}) - Ping: {} ms | TCP: Success",
                endpoint.address,
                ms(*latency)
            ),
            Outcome::Warning { name, endpoint, probe, attempt, max_attempts, latency } => {
                let ping = latency.map(ms).unwrap_or_else(|| "None".to_string());
                write!(
                    f,
                    "⚠️ {name} (IP: {}) - Ping: {ping} ms | {} Failed (Attempt {attempt}/{max_attempts})",
                    endpoint.address,
                    probe_label(*probe)
                )
            }
            Outcome::Switched { name, from, to, reason } => write!(
                f,
                "🔀 {name} (IP: {}) - {} exhausted, switched to {}",
                from.address,
                probe_label(*reason),
                to.address
            ),
            Outcome::NoAlternative { name, endpoint, reason, max_attempts } => write!(
                f,
                "❌ {name} (IP: {}) - {} Failed after {max_attempts} attempts. No alternative IP found.",
                endpoint.address,
                probe_label(*reason)
            ),
            Outcome::FailoverPending { name, endpoint, original, reason } => write!(
                f,
                "⚠️ {name} (IP: {}) - {} failing on alternate; waiting for original {} to recover",
                endpoint.address,
                probe_label(*reason),
                original.address
            ),
            Outcome::Reverted { name, endpoint, checks } => write!(
                f,
                "✅ {name} (IP: {}) - Reverted to original IP after {checks} successful ping and TCP checks.",
                endpoint.address
            ),
            Outcome::UpstreamError { name, action, error } => {
                write!(f, "🛑 {name} - DNS {action} failed: {error}")
            }
            Outcome::Fatal { name, error } => {
                write!(f, "💥 {name} - state not persisted: {error}")
            }
        }
    }
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dns_failover_probes_total` (counter): probes by kind and result
//! - `dns_failover_transitions_total` (counter): switches and reverts
//! - `dns_failover_upstream_errors_total` (counter): DNS/notifier/store failures
//! - `dns_failover_cycle_duration_seconds` (histogram): reconciliation pass time
//! - `dns_failover_names` (gauge): names evaluated in the last cycle
//! - `dns_failover_failovers_active` (gauge): names currently on an alternate

use std::net::SocketAddr;
use std::time::Duration;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use crate::health::ProbeKind;

/// Start the Prometheus scrape endpoint. Must be called inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_probe(kind: ProbeKind, success: bool) {
    let result = if success { "success" } else { "failure" };
    ::metrics::counter!("dns_failover_probes_total", "kind" => kind.as_str(), "result" => result)
        .increment(1);
}

/// `kind` is "switch" or "revert".
pub fn record_transition(kind: &'static str) {
    ::metrics::counter!("dns_failover_transitions_total", "kind" => kind).increment(1);
}

/// `service` is "dns", "notifier" or "store".
pub fn record_upstream_error(service: &'static str) {
    ::metrics::counter!("dns_failover_upstream_errors_total", "service" => service).increment(1);
}

pub fn record_cycle(duration: Duration, names: usize) {
    ::metrics::histogram!("dns_failover_cycle_duration_seconds").record(duration.as_secs_f64());
    ::metrics::gauge!("dns_failover_names").set(names as f64);
}

pub fn record_active_failovers(count: usize) {
    ::metrics::gauge!("dns_failover_failovers_active").set(count as f64);
}

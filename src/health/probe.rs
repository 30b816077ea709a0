//! Latency and connectivity probes.
//!
//! # Responsibilities
//! - Measure round-trip latency to an endpoint
//! - Check that the endpoint's port accepts TCP connections
//! - Report failures as plain negatives, never as errors

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time;
use crate::config::{LatencyMethod, ProbeConfig};
use crate::health::ping;
use crate::observability::metrics;
use crate::pool::Endpoint;

/// Which probe produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Latency,
    Connectivity,
}

impl ProbeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeKind::Latency => "latency",
            ProbeKind::Connectivity => "connectivity",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reachability probes for one endpoint. Implementations must be safe to
/// call concurrently for different endpoints.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Round-trip time, or `None` if the endpoint did not answer in time.
    async fn latency(&self, endpoint: Endpoint) -> Option<Duration>;

    /// Whether a TCP connection to `endpoint.port` succeeds in time.
    async fn connectivity(&self, endpoint: Endpoint) -> bool;
}

/// Probes real endpoints over the network.
#[derive(Debug, Clone)]
pub struct SystemProber {
    method: LatencyMethod,
    latency_timeout: Duration,
    connectivity_timeout: Duration,
}

impl SystemProber {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            method: config.latency_method,
            latency_timeout: config.latency_timeout(),
            connectivity_timeout: config.connectivity_timeout(),
        }
    }
}

#[async_trait]
impl Prober for SystemProber {
    async fn latency(&self, endpoint: Endpoint) -> Option<Duration> {
        let rtt = match self.method {
            LatencyMethod::Icmp => ping::icmp_rtt(endpoint.address, self.latency_timeout).await,
            LatencyMethod::Tcp => tcp_connect(endpoint, self.latency_timeout).await,
        };
        metrics::record_probe(ProbeKind::Latency, rtt.is_some());
        rtt
    }

    async fn connectivity(&self, endpoint: Endpoint) -> bool {
        let ok = tcp_connect(endpoint, self.connectivity_timeout).await.is_some();
        metrics::record_probe(ProbeKind::Connectivity, ok);
        ok
    }
}

/// Connect and immediately drop; returns the connect time.
async fn tcp_connect(endpoint: Endpoint, deadline: Duration) -> Option<Duration> {
    let addr = endpoint.socket_addr();
    let start = Instant::now();
    match time::timeout(deadline, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => Some(start.elapsed()),
        Ok(Err(e)) => {
            tracing::debug!(%addr, error = %e, "TCP connect failed");
            None
        }
        Err(_) => {
            tracing::debug!(%addr, "TCP connect timed out");
            None
        }
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the daemon.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the failover daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DaemonConfig {
    /// DNS provider settings.
    pub cloudflare: CloudflareConfig,

    /// Ordered candidate pool.
    pub pool: Vec<PoolEntry>,

    /// Thresholds and cadence.
    pub failover: FailoverConfig,

    /// Probe timeouts and revert confirmation.
    pub probe: ProbeConfig,

    /// Durable state location.
    pub state: StateConfig,

    /// Operator notification channel.
    pub notifier: NotifierConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Read-only admin API.
    pub admin: AdminConfig,
}

/// Cloudflare DNS API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CloudflareConfig {
    /// API base URL (overridable for testing).
    pub api_base: String,

    /// Environment variable holding the API token.
    pub api_token_env: String,

    /// Zone identifiers whose A records are managed.
    pub zones: Vec<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Records requested per listing page.
    pub per_page: u32,
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.cloudflare.com/client/v4".to_string(),
            api_token_env: "CLOUDFLARE_API_TOKEN".to_string(),
            zones: Vec::new(),
            request_timeout_secs: 10,
            per_page: 100,
        }
    }
}

/// One candidate endpoint. Order in the `[[pool]]` list is significant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolEntry {
    /// Address the A record points at.
    pub address: IpAddr,

    /// TCP port used by the connectivity probe.
    pub port: u16,
}

/// Failover thresholds and cycle cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FailoverConfig {
    /// Consecutive failures of one probe kind before a switch is attempted.
    pub max_attempts: u32,

    /// Target time between cycle starts in seconds.
    pub cycle_interval_secs: u64,

    /// Names evaluated concurrently within a cycle.
    pub max_concurrent_names: usize,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cycle_interval_secs: 120,
            max_concurrent_names: 8,
        }
    }
}

impl FailoverConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }
}

/// How the latency probe measures round-trip time.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LatencyMethod {
    /// One ICMP echo via the system `ping` binary.
    #[default]
    Icmp,
    /// TCP connect time to the endpoint's port.
    Tcp,
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub latency_method: LatencyMethod,

    /// Latency probe timeout in milliseconds.
    pub latency_timeout_ms: u64,

    /// Connectivity probe timeout in milliseconds.
    pub connectivity_timeout_ms: u64,

    /// Consecutive passes of each probe kind required to revert.
    pub revert_probe_count: u32,

    /// Pause between revert probes in milliseconds.
    pub revert_probe_spacing_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            latency_method: LatencyMethod::Icmp,
            latency_timeout_ms: 2_000,
            connectivity_timeout_ms: 5_000,
            revert_probe_count: 3,
            revert_probe_spacing_ms: 2_000,
        }
    }
}

impl ProbeConfig {
    pub fn latency_timeout(&self) -> Duration {
        Duration::from_millis(self.latency_timeout_ms)
    }

    pub fn connectivity_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity_timeout_ms)
    }

    pub fn revert_probe_spacing(&self) -> Duration {
        Duration::from_millis(self.revert_probe_spacing_ms)
    }
}

/// Durable state configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StateConfig {
    /// Path of the JSON state file.
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("status.json"),
        }
    }
}

/// Telegram notifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Send messages to Telegram. When disabled, messages are only logged.
    pub enabled: bool,

    /// Bot API base URL (overridable for testing).
    pub api_base: String,

    /// Environment variable holding the bot token.
    pub bot_token_env: String,

    /// Destination chat.
    pub chat_id: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: "https://api.telegram.org".to_string(),
            bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            chat_id: String::new(),
            request_timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,

    /// Environment variable holding the bearer token.
    pub api_key_env: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
            api_key_env: "DNS_FAILOVER_ADMIN_KEY".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: DaemonConfig = toml::from_str(
            r#"
            [cloudflare]
            zones = ["zone-a"]

            [[pool]]
            address = "192.0.2.1"
            port = 8587

            [[pool]]
            address = "192.0.2.2"
            port = 8586
            "#,
        )
        .unwrap();

        assert_eq!(config.cloudflare.zones, vec!["zone-a"]);
        assert_eq!(config.pool.len(), 2);
        assert_eq!(config.pool[1].port, 8586);
        assert_eq!(config.failover.max_attempts, 3);
        assert_eq!(config.failover.cycle_interval(), Duration::from_secs(120));
        assert_eq!(config.probe.latency_timeout(), Duration::from_secs(2));
        assert_eq!(config.probe.connectivity_timeout(), Duration::from_secs(5));
        assert_eq!(config.probe.revert_probe_count, 3);
        assert_eq!(config.probe.revert_probe_spacing(), Duration::from_secs(2));
        assert_eq!(config.probe.latency_method, LatencyMethod::Icmp);
        assert_eq!(config.state.path, PathBuf::from("status.json"));
        assert!(!config.notifier.enabled);
    }

    #[test]
    fn test_enum_fields_parse_lowercase() {
        let config: DaemonConfig = toml::from_str(
            r#"
            [probe]
            latency_method = "tcp"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.probe.latency_method, LatencyMethod::Tcp);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}

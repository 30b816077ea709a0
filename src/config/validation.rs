//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds > 0, ports valid)
//! - Check pool addresses are unique
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DaemonConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use crate::config::schema::DaemonConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &DaemonConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.pool.is_empty() {
        errors.push(ValidationError::new("pool", "at least one endpoint is required"));
    }
    let mut seen = HashSet::new();
    for (i, entry) in config.pool.iter().enumerate() {
        if !seen.insert(entry.address) {
            errors.push(ValidationError::new(
                format!("pool[{i}].address"),
                format!("duplicate address {}", entry.address),
            ));
        }
        if entry.port == 0 {
            errors.push(ValidationError::new(format!("pool[{i}].port"), "must be non-zero"));
        }
    }

    if config.cloudflare.zones.is_empty() {
        errors.push(ValidationError::new("cloudflare.zones", "at least one zone is required"));
    }
    if config.cloudflare.zones.iter().any(|z| z.trim().is_empty()) {
        errors.push(ValidationError::new("cloudflare.zones", "zone id must not be blank"));
    }
    check_url(&mut errors, "cloudflare.api_base", &config.cloudflare.api_base);
    if config.cloudflare.request_timeout_secs == 0 {
        errors.push(ValidationError::new("cloudflare.request_timeout_secs", "must be > 0"));
    }
    if config.cloudflare.per_page == 0 {
        errors.push(ValidationError::new("cloudflare.per_page", "must be > 0"));
    }

    if config.failover.max_attempts == 0 {
        errors.push(ValidationError::new("failover.max_attempts", "must be >= 1"));
    }
    if config.failover.cycle_interval_secs == 0 {
        errors.push(ValidationError::new("failover.cycle_interval_secs", "must be > 0"));
    }
    if config.failover.max_concurrent_names == 0 {
        errors.push(ValidationError::new("failover.max_concurrent_names", "must be >= 1"));
    }

    if config.probe.latency_timeout_ms == 0 {
        errors.push(ValidationError::new("probe.latency_timeout_ms", "must be > 0"));
    }
    if config.probe.connectivity_timeout_ms == 0 {
        errors.push(ValidationError::new("probe.connectivity_timeout_ms", "must be > 0"));
    }
    if config.probe.revert_probe_count == 0 {
        errors.push(ValidationError::new("probe.revert_probe_count", "must be >= 1"));
    }

    if config.state.path.as_os_str().is_empty() {
        errors.push(ValidationError::new("state.path", "must not be empty"));
    }

    if config.notifier.enabled {
        if config.notifier.chat_id.trim().is_empty() {
            errors.push(ValidationError::new("notifier.chat_id", "required when notifier is enabled"));
        }
        check_url(&mut errors, "notifier.api_base", &config.notifier.api_base);
    }

    if config.observability.metrics_enabled {
        check_socket_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }
    if config.admin.enabled {
        check_socket_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if let Err(e) = url::Url::parse(value) {
        errors.push(ValidationError::new(field, format!("invalid URL '{value}': {e}")));
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("invalid socket address '{value}'")));
    }
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the DNS client, notifier, state store and prober from config
//! - Wire them into the failover engine and reconciler
//! - Prepare the admin API state when enabled
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;
use thiserror::Error;
use crate::admin::AdminState;
use crate::config::{Credentials, DaemonConfig};
use crate::dns::{CloudflareClient, DnsError, DnsRecordStore};
use crate::failover::{EngineSettings, FailoverEngine};
use crate::health::{Prober, SystemProber};
use crate::notifier::{LogNotifier, Notifier, NotifyError, TelegramNotifier};
use crate::pool::CandidatePool;
use crate::reconcile::Reconciler;
use crate::store::{FileStateStore, StateStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("DNS client setup failed: {0}")]
    Dns(#[from] DnsError),

    #[error("notifier setup failed: {0}")]
    Notifier(#[from] NotifyError),

    #[error("state store could not be opened: {0}")]
    Store(#[from] StoreError),
}

/// Fully wired daemon, ready to run.
pub struct Daemon {
    pub reconciler: Reconciler,
    pub store: Arc<dyn StateStore>,
    /// Present when the admin API is enabled.
    pub admin: Option<AdminState>,
}

/// Build the daemon with network probes.
pub fn build(config: &DaemonConfig, credentials: &Credentials) -> Result<Daemon, StartupError> {
    build_with_prober(config, credentials, Arc::new(SystemProber::new(&config.probe)))
}

/// Build the daemon around a caller-supplied prober.
pub fn build_with_prober(
    config: &DaemonConfig,
    credentials: &Credentials,
    prober: Arc<dyn Prober>,
) -> Result<Daemon, StartupError> {
    let pool = Arc::new(CandidatePool::from_config(&config.pool));
    tracing::info!(pool = pool.len(), zones = config.cloudflare.zones.len(), "Candidate pool loaded");

    let dns: Arc<dyn DnsRecordStore> =
        Arc::new(CloudflareClient::new(&config.cloudflare, &credentials.cloudflare_token)?);

    let notifier: Arc<dyn Notifier> = match &credentials.telegram_token {
        Some(token) if config.notifier.enabled => {
            tracing::info!(chat_id = %config.notifier.chat_id, "Telegram notifications enabled");
            Arc::new(TelegramNotifier::new(&config.notifier, token)?)
        }
        _ => {
            tracing::info!("Telegram notifications disabled, logging notifications only");
            Arc::new(LogNotifier)
        }
    };

    let store: Arc<dyn StateStore> = Arc::new(FileStateStore::open(&config.state.path)?);

    let engine = Arc::new(FailoverEngine::new(
        pool.clone(),
        prober,
        dns.clone(),
        store.clone(),
        EngineSettings::from_config(&config.failover, &config.probe),
    ));

    let reconciler = Reconciler::new(
        engine,
        dns,
        pool.clone(),
        notifier,
        config.cloudflare.zones.clone(),
        &config.failover,
    );

    let admin = match &credentials.admin_key {
        Some(key) if config.admin.enabled => Some(AdminState::new(store.clone(), pool, key)),
        _ => None,
    };

    Ok(Daemon {
        reconciler,
        store,
        admin,
    })
}

//! DNS failover daemon.
//!
//! Watches the A records of the configured zones. A name whose endpoint stops
//! answering probes is repointed at a healthy endpoint from the candidate pool,
//! and pointed back once the original has recovered.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐  list A records  ┌───────────────┐
//!   │  reconciler  │─────────────────▶│  Cloudflare   │
//!   │ (every 120s) │                  │    v4 API     │
//!   └──────┬───────┘                  └───────▲───────┘
//!          │ evaluate(name)                   │ PATCH record
//!          ▼                                  │
//!   ┌──────────────┐  probes  ┌─────────┐     │
//!   │   failover   │─────────▶│ health  │     │
//!   │    engine    │──────────┴─────────┴─────┘
//!   └──────┬───────┘
//!          │ put(state)            outcomes
//!          ▼                          │
//!   ┌──────────────┐          ┌───────▼──────┐
//!   │ state store  │          │   notifier   │
//!   │ (JSON file)  │          │  (Telegram)  │
//!   └──────────────┘          └──────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use dns_failover::admin;
use dns_failover::config::{load_config, Credentials};
use dns_failover::lifecycle::{self, signals, Shutdown};
use dns_failover::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "dns-failover", version)]
#[command(about = "Health-checking DNS failover for Cloudflare A records", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "DNS_FAILOVER_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Run a single reconciliation cycle and exit
    #[arg(long)]
    once: bool,

    /// Validate configuration and credentials, then exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    let credentials = Credentials::from_env(&config)?;

    if args.check_config {
        println!(
            "Configuration OK: {} pool endpoints, {} zones",
            config.pool.len(),
            config.cloudflare.zones.len()
        );
        return Ok(());
    }

    logging::init(&config.observability)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "dns-failover starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let daemon = lifecycle::build(&config, &credentials)?;

    if args.once {
        let report = daemon.reconciler.run_cycle().await;
        tracing::info!(
            cycle_id = %report.cycle_id,
            names = report.names,
            zone_errors = report.zone_errors,
            "Single cycle finished"
        );
        return Ok(());
    }

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let admin_task = match daemon.admin {
        Some(state) => {
            let listener = TcpListener::bind(&config.admin.bind_address).await?;
            let rx = shutdown.subscribe();
            Some(tokio::spawn(async move {
                if let Err(e) = admin::serve(listener, state, rx).await {
                    tracing::error!(error = %e, "Admin API failed");
                }
            }))
        }
        None => None,
    };

    daemon.reconciler.run(shutdown.subscribe()).await;

    if let Some(task) = admin_task {
        Shutdown::join("admin", task).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

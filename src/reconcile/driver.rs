//! Reconciliation loop.
//!
//! # Responsibilities
//! - List monitored names across every configured zone
//! - Evaluate names concurrently, results in listing order
//! - Send the aggregated notification batches
//! - Run on a fixed cadence until shutdown

use futures_util::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::Instrument;
use uuid::Uuid;
use crate::config::FailoverConfig;
use crate::dns::DnsRecordStore;
use crate::failover::{Assignment, FailoverEngine};
use crate::notifier::Notifier;
use crate::observability::metrics;
use crate::pool::CandidatePool;
use crate::reconcile::CycleReport;

pub struct Reconciler {
    engine: Arc<FailoverEngine>,
    dns: Arc<dyn DnsRecordStore>,
    pool: Arc<CandidatePool>,
    notifier: Arc<dyn Notifier>,
    zones: Vec<String>,
    interval: Duration,
    max_concurrent: usize,
}

impl Reconciler {
    pub fn new(
        engine: Arc<FailoverEngine>,
        dns: Arc<dyn DnsRecordStore>,
        pool: Arc<CandidatePool>,
        notifier: Arc<dyn Notifier>,
        zones: Vec<String>,
        config: &FailoverConfig,
    ) -> Self {
        Self {
            engine,
            dns,
            pool,
            notifier,
            zones,
            interval: config.cycle_interval(),
            max_concurrent: config.max_concurrent_names.max(1),
        }
    }

    /// Pool-backed A records of every zone, one per name.
    ///
    /// Returns the assignments and the number of zones that failed to list.
    pub async fn fetch_assignments(&self) -> (Vec<Assignment>, usize) {
        let mut assignments = Vec::new();
        let mut seen = HashSet::new();
        let mut zone_errors = 0;

        for zone in &self.zones {
            let records = match self.dns.list_a_records(zone).await {
                Ok(records) => records,
                Err(e) => {
                    metrics::record_upstream_error("dns");
                    tracing::error!(zone = %zone, error = %e, "Failed to list DNS records");
                    zone_errors += 1;
                    continue;
                }
            };

            for record in records {
                let Some(endpoint) = self.pool.find(record.ip) else {
                    continue;
                };
                if !seen.insert(record.name.clone()) {
                    tracing::warn!(
                        zone = %zone,
                        name = %record.name,
                        ip = %record.ip,
                        "Name listed more than once, keeping the first record"
                    );
                    continue;
                }
                assignments.push(Assignment {
                    zone: zone.clone(),
                    record_id: record.id,
                    name: record.name,
                    endpoint,
                });
            }
        }

        (assignments, zone_errors)
    }

    /// One full pass: list, evaluate, notify.
    pub async fn run_cycle(&self) -> CycleReport {
        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("cycle", %cycle_id);
        self.cycle(cycle_id).instrument(span).await
    }

    async fn cycle(&self, cycle_id: Uuid) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::empty(cycle_id);

        let (assignments, zone_errors) = self.fetch_assignments().await;
        report.zone_errors = zone_errors;
        report.names = assignments.len();

        if assignments.is_empty() {
            tracing::info!(zones = self.zones.len(), "No pool-backed names found, skipping cycle");
            report.duration = started.elapsed();
            return report;
        }

        let engine = self.engine.clone();
        let evaluations: Vec<_> = stream::iter(assignments)
            .map(move |assignment| {
                let engine = engine.clone();
                async move { engine.evaluate(&assignment, SystemTime::now()).await }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        for evaluation in evaluations {
            if evaluation.state.as_ref().is_some_and(|s| s.active_endpoint.is_some()) {
                report.active_failovers += 1;
            }
            report.outcomes.extend(evaluation.outcomes);
        }

        self.notify(&report).await;

        report.duration = started.elapsed();
        metrics::record_cycle(report.duration, report.names);
        metrics::record_active_failovers(report.active_failovers);
        tracing::info!(
            names = report.names,
            changes = report.changes().count(),
            active_failovers = report.active_failovers,
            duration_ms = report.duration.as_millis() as u64,
            "Cycle complete"
        );
        report
    }

    /// State changes first, then routine status.
    async fn notify(&self, report: &CycleReport) {
        for message in [report.changes_message(), report.status_message()].into_iter().flatten() {
            if let Err(e) = self.notifier.send(&message).await {
                metrics::record_upstream_error("notifier");
                tracing::warn!(error = %e, "Failed to send notification");
            }
        }
    }

    /// Run cycles until shutdown. An in-flight cycle always completes.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            zones = self.zones.len(),
            pool = self.pool.len(),
            "Reconciler starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // Shutdown first: after an overrun the next tick is already due.
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Reconciler received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    if report.duration > self.interval {
                        tracing::warn!(
                            duration_ms = report.duration.as_millis() as u64,
                            "Cycle overran its interval, starting the next one immediately"
                        );
                    }
                }
            }
        }
    }
}

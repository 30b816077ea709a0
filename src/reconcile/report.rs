//! Per-cycle summary and notification batches.

use std::time::Duration;
use uuid::Uuid;
use crate::failover::Outcome;

/// What one reconciliation pass did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    /// Names evaluated this cycle.
    pub names: usize,
    /// Zones whose listing failed.
    pub zone_errors: usize,
    /// Names left pointing at an alternate.
    pub active_failovers: usize,
    /// Outcomes in listing order.
    pub outcomes: Vec<Outcome>,
    pub duration: Duration,
}

impl CycleReport {
    pub fn empty(cycle_id: Uuid) -> Self {
        Self {
            cycle_id,
            names: 0,
            zone_errors: 0,
            active_failovers: 0,
            outcomes: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn changes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_state_change())
    }

    pub fn status(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_state_change())
    }

    /// Switches, reverts and failures, one per line.
    pub fn changes_message(&self) -> Option<String> {
        render(self.changes())
    }

    /// Routine healthy and warning lines.
    pub fn status_message(&self) -> Option<String> {
        render(self.status())
    }
}

fn render<'a>(outcomes: impl Iterator<Item = &'a Outcome>) -> Option<String> {
    let lines: Vec<String> = outcomes.map(ToString::to_string).collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

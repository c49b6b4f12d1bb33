//! Append-only hazard and action logs, transfer counters and the quarantine set.

use crate::sync::lock;
use mycel_core::admission::{ActionRecord, Decision, HazardEvent};
use mycel_core::types::{NodeId, PatternId, Tick, TransferId};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Append-only logs plus running counters.
#[derive(Default)]
pub struct Journal {
    hazards: Mutex<Vec<HazardEvent>>,
    actions: Mutex<Vec<ActionRecord>>,
    quarantine: Mutex<BTreeSet<NodeId>>,
    total_transfers: AtomicU64,
    failed_transfers: AtomicU64,
}

/// The hop a decision was made for.
#[derive(Debug, Clone, Copy)]
pub struct HopKey {
    pub tick: Tick,
    pub transfer_id: TransferId,
    pub pattern_id: PatternId,
    pub from: NodeId,
    pub to: NodeId,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a decision. Clean decisions leave no trace.
    pub fn record_decision(&self, hop: HopKey, decision: &Decision) {
        if decision.hazards.is_empty() {
            return;
        }
        lock(&self.hazards).push(HazardEvent {
            tick: hop.tick,
            transfer_id: hop.transfer_id,
            pattern_id: hop.pattern_id,
            from: hop.from,
            to: hop.to,
            hazards: decision.hazards.clone(),
        });
        lock(&self.actions).push(ActionRecord {
            tick: hop.tick,
            transfer_id: hop.transfer_id,
            pattern_id: hop.pattern_id,
            hazard: decision.deciding_hazard(),
            action: decision.action.clone(),
        });
    }

    /// Count one committed hop.
    pub fn record_hop(&self) {
        self.total_transfers.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one transfer that did not reach its destination.
    pub fn record_failure(&self) {
        self.failed_transfers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_transfers(&self) -> u64 {
        self.total_transfers.load(Ordering::Relaxed)
    }

    pub fn failed_transfers(&self) -> u64 {
        self.failed_transfers.load(Ordering::Relaxed)
    }

    pub fn quarantine(&self, nodes: impl IntoIterator<Item = NodeId>) {
        lock(&self.quarantine).extend(nodes);
    }

    /// Keep only quarantined nodes for which `keep` holds.
    pub fn retain_quarantine(&self, mut keep: impl FnMut(NodeId) -> bool) {
        lock(&self.quarantine).retain(|id| keep(*id));
    }

    pub fn quarantined(&self) -> Vec<NodeId> {
        lock(&self.quarantine).iter().copied().collect()
    }

    pub fn hazard_count(&self) -> usize {
        lock(&self.hazards).len()
    }

    pub fn action_count(&self) -> usize {
        lock(&self.actions).len()
    }

    /// The most recent `limit` hazard events, oldest first.
    pub fn hazard_log(&self, limit: usize) -> Vec<HazardEvent> {
        tail(&lock(&self.hazards), limit)
    }

    /// The most recent `limit` corrective actions, oldest first.
    pub fn action_log(&self, limit: usize) -> Vec<ActionRecord> {
        tail(&lock(&self.actions), limit)
    }
}

fn tail<T: Clone>(entries: &[T], limit: usize) -> Vec<T> {
    entries[entries.len().saturating_sub(limit)..].to_vec()
}

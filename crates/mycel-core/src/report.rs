//! Results and reports returned by network operations.

use crate::admission::{Action, HazardKind};
use crate::types::{NodeId, TransferId};
use serde::{Deserialize, Serialize};

/// Final status of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Success,
    /// Rejected by policy; nothing was mutated.
    Blocked,
    /// Retryable rejection; nothing was mutated.
    Waiting,
    /// No route, or a multi-hop transfer stopped part way.
    Failed,
}

/// Outcome of `Transfer`. Policy outcomes are data, never errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub transfer_id: TransferId,
    pub status: TransferStatus,
    /// Full path on success.
    pub path: Option<Vec<NodeId>>,
    /// Nodes reached before a multi-hop transfer failed.
    pub partial_path: Option<Vec<NodeId>>,
    /// Sum of per-hop costs on success.
    pub cost: Option<f64>,
    pub hops: usize,
    /// Whether any hop was committed at a reduced bandwidth.
    pub throttled: bool,
    pub reason: Option<String>,
    /// Hazards detected along the way, highest precedence first. On a
    /// success these are the hazards the transfer was throttled for.
    pub hazards: Vec<HazardKind>,
}

impl TransferResult {
    pub fn success(transfer_id: TransferId, path: Vec<NodeId>, cost: f64, throttled: bool) -> Self {
        Self {
            transfer_id,
            status: TransferStatus::Success,
            hops: path.len().saturating_sub(1),
            path: Some(path),
            partial_path: None,
            cost: Some(cost),
            throttled,
            reason: None,
            hazards: Vec::new(),
        }
    }

    /// A rejection by admission control, mapped from the action taken.
    pub fn rejected(transfer_id: TransferId, action: &Action, hazards: Vec<HazardKind>) -> Self {
        let status = match action {
            Action::Wait { .. } => TransferStatus::Waiting,
            _ => TransferStatus::Blocked,
        };
        Self {
            transfer_id,
            status,
            path: None,
            partial_path: None,
            cost: None,
            hops: 0,
            throttled: false,
            reason: action.reason().map(str::to_string),
            hazards,
        }
    }

    pub fn failed(transfer_id: TransferId, reason: impl Into<String>) -> Self {
        Self {
            transfer_id,
            status: TransferStatus::Failed,
            path: None,
            partial_path: None,
            cost: None,
            hops: 0,
            throttled: false,
            reason: Some(reason.into()),
            hazards: Vec::new(),
        }
    }

    /// Attach hazards that were tolerated on the way.
    pub fn with_hazards(mut self, hazards: Vec<HazardKind>) -> Self {
        self.hazards = hazards;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == TransferStatus::Success
    }
}

/// What a heal cycle changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealReport {
    pub removed_nodes: Vec<NodeId>,
    /// Under-connected nodes that gained at least one link.
    pub repaired_nodes: Vec<NodeId>,
    pub reinforced_links: usize,
    pub pruned_links: usize,
    pub expired_patterns: usize,
}

impl HealReport {
    /// Whether the cycle removed anything.
    pub fn removed_anything(&self) -> bool {
        !self.removed_nodes.is_empty() || self.pruned_links > 0
    }
}

/// Coarse network condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
    Empty,
    Healthy,
    Degraded,
}

/// Aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub status: NetworkStatus,
    pub node_count: usize,
    /// Directed link entries (two per connection).
    pub link_count: usize,
    pub avg_health: f64,
    pub avg_connections: f64,
    pub total_transfers: u64,
    pub failed_transfers: u64,
    pub success_rate: f64,
    pub hazard_count: usize,
    pub corrective_actions: usize,
    pub quarantined_nodes: usize,
}

/// Health check summary with human-readable issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: NetworkStatus,
    pub healthy: bool,
    pub issues: Vec<String>,
    pub stats: NetworkStats,
}

impl HealthReport {
    /// Derive issues from a stats snapshot.
    pub fn from_stats(stats: NetworkStats) -> Self {
        let mut issues = Vec::new();

        if stats.status == NetworkStatus::Degraded {
            issues.push("Network connectivity is degraded".to_string());
        }
        if stats.quarantined_nodes > 0 {
            issues.push(format!("{} nodes are quarantined", stats.quarantined_nodes));
        }
        if stats.node_count > 0 && stats.avg_health < 0.5 {
            issues.push("Average node health is below 50%".to_string());
        }
        if stats.failed_transfers as f64 > stats.total_transfers.max(1) as f64 * 0.1 {
            issues.push("Transfer failure rate exceeds 10%".to_string());
        }

        Self {
            status: stats.status,
            healthy: issues.is_empty(),
            issues,
            stats,
        }
    }
}

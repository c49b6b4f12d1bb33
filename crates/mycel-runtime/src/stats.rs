//! Statistics, health check and a text rendering of the network.

use crate::network::Network;
use crate::sync::{lock, read};
use mycel_core::report::{HealthReport, NetworkStats, NetworkStatus};
use std::fmt;

/// Nodes shown by [`Network::render`].
const RENDER_LIMIT: usize = 10;

impl Network {
    /// A consistent snapshot of aggregate statistics.
    pub fn stats(&self) -> NetworkStats {
        let registry = read(&self.registry);
        let fabric = read(&self.fabric);

        let node_count = registry.len();
        let total = self.journal.total_transfers();
        let failed = self.journal.failed_transfers();
        let attempts = (total + failed).max(1);

        let (avg_health, avg_connections) = if node_count == 0 {
            (0.0, 0.0)
        } else {
            let health: f64 = registry.cells().map(|(_, cell)| lock(cell).health).sum();
            let degree: usize = registry.ids().into_iter().map(|id| fabric.degree(id)).sum();
            (
                health / node_count as f64,
                degree as f64 / node_count as f64,
            )
        };

        let status = if node_count == 0 {
            NetworkStatus::Empty
        } else if avg_health > 0.7 {
            NetworkStatus::Healthy
        } else {
            NetworkStatus::Degraded
        };

        NetworkStats {
            status,
            node_count,
            link_count: fabric.link_count(),
            avg_health,
            avg_connections,
            total_transfers: total,
            failed_transfers: failed,
            success_rate: total as f64 / attempts as f64,
            hazard_count: self.journal.hazard_count(),
            corrective_actions: self.journal.action_count(),
            quarantined_nodes: self.journal.quarantined().len(),
        }
    }

    /// Stats plus a list of human-readable issues.
    pub fn health_check(&self) -> HealthReport {
        HealthReport::from_stats(self.stats())
    }

    /// ASCII picture of the first few nodes by id.
    pub fn render(&self) -> String {
        let registry = read(&self.registry);
        let fabric = read(&self.fabric);
        if registry.is_empty() {
            return "Network is empty".to_string();
        }

        let ids = registry.ids();
        let mut out = format!(
            "Mycelium network ({} nodes, {} links)\n\n",
            ids.len(),
            fabric.link_count()
        );
        for &id in ids.iter().take(RENDER_LIMIT) {
            let Ok(cell) = registry.get(id) else { continue };
            let node = lock(cell);
            let bar = "█".repeat((node.health.clamp(0.0, 1.0) * 10.0) as usize);
            out.push_str(&format!(
                "{id}: {bar:<10} ({:.1}) -> {} connections, {} patterns\n",
                node.health,
                fabric.degree(id),
                node.hosted_patterns.len(),
            ));
        }
        if ids.len() > RENDER_LIMIT {
            out.push_str(&format!("... and {} more nodes\n", ids.len() - RENDER_LIMIT));
        }
        out
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

//! Topology Manager: growth and self-healing.
//!
//! Growth attaches a node to healthy peers picked by the network's
//! [`PeerSelector`](mycel_core::selection::PeerSelector). Healing is the
//! maintenance pass: it removes the dead, repairs the isolated, drops weak
//! links, reinforces busy ones and lets old patterns lapse. It runs under
//! the registry and fabric write locks, so no transfer observes a half
//! healed network.

use crate::admission::AdmissionController;
use crate::fabric::LinkFabric;
use crate::network::Network;
use crate::registry::NodeRegistry;
use crate::sync::{lock, read, write};
use mycel_core::error::Result;
use mycel_core::report::HealReport;
use mycel_core::types::NodeId;
use tracing::{debug, info};

impl Network {
    /// Link `id` to up to `k` healthy peers it is not yet linked to.
    ///
    /// Returns the peers that were linked, in selection order.
    pub fn auto_connect(&self, id: NodeId, k: usize) -> Result<Vec<NodeId>> {
        let registry = read(&self.registry);
        registry.get(id)?;
        let mut fabric = write(&self.fabric);
        Ok(self.auto_connect_locked(&registry, &mut fabric, id, k))
    }

    pub(crate) fn auto_connect_locked(
        &self,
        registry: &NodeRegistry,
        fabric: &mut LinkFabric,
        id: NodeId,
        k: usize,
    ) -> Vec<NodeId> {
        if k == 0 {
            return Vec::new();
        }
        let existing = fabric.neighbors(id);
        let candidates: Vec<NodeId> = registry
            .healthy_ids(self.config.min_node_health)
            .into_iter()
            .filter(|peer| *peer != id && !existing.contains(peer))
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let chosen = lock(&self.selector).select(id, &candidates, k);
        let mut linked = Vec::with_capacity(chosen.len().min(k));
        for peer in chosen {
            if linked.len() == k {
                break;
            }
            if !candidates.contains(&peer) || linked.contains(&peer) {
                continue;
            }
            let params = self.sample_link();
            if fabric.connect(id, peer, params, None).is_some() {
                linked.push(peer);
            }
        }
        debug!(node = %id, linked = linked.len(), "auto-connected");
        linked
    }

    /// Run one maintenance pass.
    ///
    /// Calling it twice with no transfers or health changes in between
    /// leaves the second report empty.
    pub fn heal(&self) -> HealReport {
        let mut registry = write(&self.registry);
        let mut fabric = write(&self.fabric);
        let now = self.now();
        let mut report = HealReport::default();

        for id in registry.ids() {
            let dead = registry.with_node(id, |node| node.is_dead()).unwrap_or(false);
            if dead {
                registry.remove(id);
                fabric.remove_node(id);
                report.removed_nodes.push(id);
            }
        }

        for id in registry.ids() {
            if fabric.degree(id) >= self.config.min_links {
                continue;
            }
            let linked = self.auto_connect_locked(&registry, &mut fabric, id, self.config.repair_peers);
            if !linked.is_empty() {
                report.repaired_nodes.push(id);
            }
        }

        report.pruned_links = fabric.prune(self.config.prune_threshold);
        report.reinforced_links =
            fabric.reinforce(self.config.reinforce_after, self.config.reinforce_factor);

        let max_age = self.config.max_pattern_age;
        for (_, cell) in registry.cells() {
            let mut node = lock(cell);
            let before = node.hosted_patterns.len();
            node.hosted_patterns
                .retain(|_, received| now.saturating_sub(*received) <= max_age);
            report.expired_patterns += before - node.hosted_patterns.len();
        }

        let forgotten = fabric.expire_spread(now, self.config.viral_window);
        debug!(patterns = forgotten, "spread index trimmed");

        let controller = AdmissionController::new(&self.config);
        self.journal.retain_quarantine(|id| {
            registry
                .with_node(id, |node| controller.is_unhealthy(node.health))
                .unwrap_or(false)
        });

        info!(
            removed = report.removed_nodes.len(),
            repaired = report.repaired_nodes.len(),
            reinforced = report.reinforced_links,
            pruned = report.pruned_links,
            expired = report.expired_patterns,
            "heal complete"
        );
        report
    }
}

//! Transfer Engine: moves a pattern along a link or a routed path.
//!
//! Every hop is admitted and committed while both endpoint locks are held.
//! A multi-hop transfer commits hop by hop: when a later hop is rejected
//! the earlier hops stay committed and the result reports how far the
//! pattern got.

use crate::admission::{AdmissionContext, AdmissionController};
use crate::fabric::LinkFabric;
use crate::journal::HopKey;
use crate::network::Network;
use crate::registry::{lock_pair, NodeRegistry};
use crate::router;
use crate::sync::{lock, read};
use mycel_core::admission::{Decision, HazardKind};
use mycel_core::error::{MyceliumError, Result};
use mycel_core::report::TransferResult;
use mycel_core::types::*;
use tracing::{debug, warn};

/// What happened to a single hop.
enum HopOutcome {
    Committed { cost: f64, throttled: bool, hazards: Vec<HazardKind> },
    Rejected(Decision),
}

impl Network {
    /// Send `pattern_id` from `from` to `to`.
    ///
    /// Directly linked endpoints take one hop. Otherwise the pair is
    /// admitted end to end, a fewest-hop route is found and each hop is
    /// admitted and committed in turn.
    ///
    /// Unknown endpoints (or `from == to`) are errors. Policy rejections,
    /// missing routes and partial failures are reported in the result.
    pub fn transfer(
        &self,
        pattern_id: PatternId,
        from: NodeId,
        to: NodeId,
        metadata: &PatternMetadata,
    ) -> Result<TransferResult> {
        let registry = read(&self.registry);
        registry.get(from)?;
        registry.get(to)?;
        if from == to {
            return Err(MyceliumError::UnknownNode(to));
        }
        let fabric = read(&self.fabric);
        let transfer_id = TransferId::new();

        if fabric.find_link(from, to).is_some() {
            let hop = self.key(transfer_id, pattern_id, from, to);
            let result = match self.hop(&registry, &fabric, hop, metadata)? {
                HopOutcome::Committed { cost, throttled, hazards } => {
                    TransferResult::success(transfer_id, vec![from, to], cost, throttled)
                        .with_hazards(hazards)
                }
                HopOutcome::Rejected(decision) => self.reject(transfer_id, decision),
            };
            return Ok(result);
        }

        let outer = self.key(transfer_id, pattern_id, from, to);
        let decision = self.admit(&registry, &fabric, outer, metadata)?;
        if !decision.action.permits_transfer() {
            return Ok(self.reject(transfer_id, decision));
        }

        let Some(path) = router::find_path(&fabric, from, to) else {
            self.journal.record_failure();
            warn!(%from, %to, pattern = %pattern_id, "no route");
            return Ok(TransferResult::failed(transfer_id, "no route"));
        };

        let mut cost = 0.0;
        let mut throttled = false;
        let mut tolerated: Vec<HazardKind> = Vec::new();
        for (i, pair) in path.windows(2).enumerate() {
            let hop = self.key(transfer_id, pattern_id, pair[0], pair[1]);
            match self.hop(&registry, &fabric, hop, metadata)? {
                HopOutcome::Committed { cost: c, throttled: t, hazards } => {
                    cost += c;
                    throttled |= t;
                    for hazard in hazards {
                        if !tolerated.contains(&hazard) {
                            tolerated.push(hazard);
                        }
                    }
                }
                HopOutcome::Rejected(decision) => {
                    self.journal.record_failure();
                    let reason = format!(
                        "hop {} -> {}: {}",
                        pair[0],
                        pair[1],
                        decision.action.reason().unwrap_or("rejected")
                    );
                    warn!(%from, %to, pattern = %pattern_id, reached = i, "{reason}");
                    let mut result = TransferResult::failed(transfer_id, reason);
                    result.partial_path = Some(path[..=i].to_vec());
                    result.hops = i;
                    result.hazards = decision.hazards;
                    return Ok(result);
                }
            }
        }

        debug!(%from, %to, pattern = %pattern_id, hops = path.len() - 1, cost, "routed transfer");
        Ok(TransferResult::success(transfer_id, path, cost, throttled).with_hazards(tolerated))
    }

    fn key(&self, transfer_id: TransferId, pattern_id: PatternId, from: NodeId, to: NodeId) -> HopKey {
        HopKey {
            tick: self.now(),
            transfer_id,
            pattern_id,
            from,
            to,
        }
    }

    fn reject(&self, transfer_id: TransferId, decision: Decision) -> TransferResult {
        self.journal.record_failure();
        warn!(transfer = ?transfer_id, action = decision.action.label(), hazards = ?decision.hazards, "transfer rejected");
        TransferResult::rejected(transfer_id, &decision.action, decision.hazards)
    }

    /// Evaluate an endpoint pair without committing anything.
    fn admit(
        &self,
        registry: &NodeRegistry,
        fabric: &LinkFabric,
        hop: HopKey,
        metadata: &PatternMetadata,
    ) -> Result<Decision> {
        let (sender, receiver) = lock_pair(
            (hop.from, registry.get(hop.from)?),
            (hop.to, registry.get(hop.to)?),
        );
        Ok(self.evaluate(registry, fabric, hop, &sender, &receiver, metadata))
    }

    /// Admit and, if allowed, commit one hop under both endpoint locks.
    fn hop(
        &self,
        registry: &NodeRegistry,
        fabric: &LinkFabric,
        hop: HopKey,
        metadata: &PatternMetadata,
    ) -> Result<HopOutcome> {
        let (mut sender, mut receiver) = lock_pair(
            (hop.from, registry.get(hop.from)?),
            (hop.to, registry.get(hop.to)?),
        );
        let decision = self.evaluate(registry, fabric, hop, &sender, &receiver, metadata);
        if !decision.action.permits_transfer() {
            return Ok(HopOutcome::Rejected(decision));
        }
        let cell = fabric
            .find_link(hop.from, hop.to)
            .ok_or(MyceliumError::UnknownNode(hop.to))?;

        let factor = decision.action.bandwidth_factor();
        let cost = {
            let mut link = lock(cell);
            let cost = link.cost(factor);
            link.history.push(TransferRecord {
                tick: hop.tick,
                pattern_id: hop.pattern_id,
                metadata: metadata.clone(),
            });
            cost
        };
        fabric.note_spread(hop.pattern_id, hop.tick);

        receiver.hosted_patterns.insert(hop.pattern_id, hop.tick);
        receiver.last_active = hop.tick;
        sender.resource_budget = (sender.resource_budget - cost).max(0.0);
        sender.last_active = hop.tick;
        self.journal.record_hop();

        debug!(from = %hop.from, to = %hop.to, pattern = %hop.pattern_id, cost, "hop committed");
        Ok(HopOutcome::Committed {
            cost,
            throttled: factor < 1.0,
            hazards: decision.hazards,
        })
    }

    fn evaluate(
        &self,
        registry: &NodeRegistry,
        fabric: &LinkFabric,
        hop: HopKey,
        sender: &Node,
        receiver: &Node,
        metadata: &PatternMetadata,
    ) -> Decision {
        let recent = fabric.recent_spread(hop.pattern_id, hop.tick, self.config.viral_window);
        let ctx = AdmissionContext::capture(sender, receiver, metadata, recent, registry.len());
        let controller = AdmissionController::new(&self.config);
        let decision = controller.evaluate(&ctx);

        if decision.hazards.contains(&HazardKind::UnhealthyEndpoint) {
            self.journal.quarantine(
                [sender, receiver]
                    .into_iter()
                    .filter(|node| controller.is_unhealthy(node.health))
                    .map(|node| node.id),
            );
        }
        self.journal.record_decision(hop, &decision);
        decision
    }
}

#[cfg(test)]
mod tests {
    use crate::network::Network;
    use mycel_core::prelude::*;

    fn network() -> Network {
        Network::new()
            .with_selector(FirstK)
            .with_link_sampler(FixedLinks::new(0.8, 2.0))
    }

    /// A line 0 - 1 - 2 - ... built by hand.
    fn line(n: u64) -> Network {
        let config = NetworkConfig { auto_connect_peers: 0, ..NetworkConfig::default() };
        let net = Network::from_config(config)
            .unwrap()
            .with_link_sampler(FixedLinks::new(0.8, 2.0));
        for id in 0..n {
            net.add_node(NodeId(id), "agent").unwrap();
        }
        for id in 1..n {
            net.connect(NodeId(id - 1), NodeId(id), None).unwrap();
        }
        net
    }

    #[test]
    fn direct_transfer_commits_one_hop() {
        let net = network();
        net.add_node(NodeId(0), "user").unwrap();
        net.add_node(NodeId(1), "user").unwrap();

        let meta = PatternMetadata::default().with("topic", "spores");
        let result = net.transfer(PatternId(7), NodeId(0), NodeId(1), &meta).unwrap();
        assert_eq!(result.status, TransferStatus::Success);
        assert_eq!(result.path, Some(vec![NodeId(0), NodeId(1)]));
        assert_eq!(result.cost, Some(0.5));

        assert_eq!(net.node(NodeId(0)).unwrap().resource_budget, 99.5);
        assert_eq!(net.node(NodeId(1)).unwrap().hosted_patterns, vec![PatternId(7)]);
        let link = net.find_link(NodeId(0), NodeId(1)).unwrap();
        assert_eq!(link.history.len(), 1);
        assert_eq!(link.history[0].metadata, meta);
        assert_eq!(net.stats().total_transfers, 1);
    }

    #[test]
    fn sacred_pattern_is_blocked_without_mutation() {
        let net = network();
        net.add_node(NodeId(0), "user").unwrap();
        net.add_node(NodeId(1), "user").unwrap();

        let result = net
            .transfer(PatternId(1), NodeId(0), NodeId(1), &PatternMetadata::sacred())
            .unwrap();
        assert_eq!(result.status, TransferStatus::Blocked);
        assert_eq!(result.hazards, vec![HazardKind::Sacred]);
        assert_eq!(net.node(NodeId(0)).unwrap().resource_budget, 100.0);
        assert!(net.node(NodeId(1)).unwrap().hosted_patterns.is_empty());
        assert_eq!(net.hazard_log(10).len(), 1);
        assert_eq!(net.stats().failed_transfers, 1);
    }

    #[test]
    fn unknown_or_identical_endpoints_are_errors() {
        let net = network();
        net.add_node(NodeId(0), "user").unwrap();
        let meta = PatternMetadata::default();
        assert!(net.transfer(PatternId(1), NodeId(0), NodeId(4), &meta).unwrap_err().is_unknown_node());
        assert!(net.transfer(PatternId(1), NodeId(0), NodeId(0), &meta).is_err());
    }

    #[test]
    fn routed_transfer_sums_hop_costs() {
        let net = line(4);
        let result = net
            .transfer(PatternId(2), NodeId(0), NodeId(3), &PatternMetadata::default())
            .unwrap();
        assert_eq!(result.status, TransferStatus::Success);
        assert_eq!(result.hops, 3);
        assert_eq!(result.cost, Some(1.5));
        assert!(net.node(NodeId(1)).unwrap().hosted_patterns.contains(&PatternId(2)));
        assert_eq!(net.stats().total_transfers, 3);
    }

    #[test]
    fn mid_path_failure_keeps_committed_hops() {
        let net = line(4);
        net.set_budget(NodeId(1), 0.0).unwrap();

        let result = net
            .transfer(PatternId(2), NodeId(0), NodeId(3), &PatternMetadata::default())
            .unwrap();
        assert_eq!(result.status, TransferStatus::Failed);
        assert_eq!(result.partial_path, Some(vec![NodeId(0), NodeId(1)]));
        assert_eq!(result.hazards, vec![HazardKind::InsufficientResources]);
        assert_eq!(
            result.reason.as_deref(),
            Some("hop node-1 -> node-2: insufficient resources")
        );
        // The first hop stays committed.
        assert!(net.node(NodeId(1)).unwrap().hosted_patterns.contains(&PatternId(2)));
        assert_eq!(net.node(NodeId(0)).unwrap().resource_budget, 99.5);
    }

    #[test]
    fn disconnected_endpoints_fail_with_no_route() {
        let net = line(2);
        net.add_node(NodeId(5), "sensor").unwrap();
        let result = net
            .transfer(PatternId(1), NodeId(0), NodeId(5), &PatternMetadata::default())
            .unwrap();
        assert_eq!(result.status, TransferStatus::Failed);
        assert_eq!(result.reason.as_deref(), Some("no route"));
        assert_eq!(net.stats().failed_transfers, 1);
    }

    #[test]
    fn viral_spread_is_throttled() {
        let net = line(2);
        let meta = PatternMetadata::default();
        // Two nodes: the third hop inside the window pushes the rate past 0.85.
        for _ in 0..2 {
            let result = net.transfer(PatternId(9), NodeId(0), NodeId(1), &meta).unwrap();
            assert!(!result.throttled);
        }
        let result = net.transfer(PatternId(9), NodeId(0), NodeId(1), &meta).unwrap();
        assert_eq!(result.status, TransferStatus::Success);
        assert!(result.throttled);
        assert_eq!(result.cost, Some(1.0));
        assert_eq!(result.hazards, vec![HazardKind::ViralOverload]);
        assert_eq!(net.action_log(1)[0].hazard, Some(HazardKind::ViralOverload));

        net.advance(net.config().viral_window);
        let result = net.transfer(PatternId(9), NodeId(0), NodeId(1), &meta).unwrap();
        assert!(!result.throttled);
    }

    #[test]
    fn unhealthy_endpoint_is_quarantined() {
        let net = line(2);
        net.set_health(NodeId(1), 0.1).unwrap();
        let result = net
            .transfer(PatternId(1), NodeId(0), NodeId(1), &PatternMetadata::default())
            .unwrap();
        assert_eq!(result.status, TransferStatus::Blocked);
        assert_eq!(result.reason.as_deref(), Some("unhealthy node"));
        assert_eq!(net.quarantined(), vec![NodeId(1)]);

        net.set_health(NodeId(1), 0.9).unwrap();
        net.heal();
        assert!(net.quarantined().is_empty());
    }

    #[test]
    fn budget_never_goes_negative() {
        let net = line(2);
        net.set_budget(NodeId(0), 1.2).unwrap();
        let meta = PatternMetadata::default();
        assert!(net.transfer(PatternId(1), NodeId(0), NodeId(1), &meta).unwrap().is_success());
        let result = net.transfer(PatternId(2), NodeId(0), NodeId(1), &meta).unwrap();
        assert_eq!(result.status, TransferStatus::Waiting);
        assert!(net.node(NodeId(0)).unwrap().resource_budget >= 0.0);
    }

    /// Sends `PatternId(9)` across the 0 - 1 link until it is throttled.
    fn spread_until_throttled(net: &Network) {
        let meta = PatternMetadata::default();
        for _ in 0..3 {
            net.transfer(PatternId(9), NodeId(0), NodeId(1), &meta).unwrap();
        }
        assert_eq!(net.action_log(1)[0].action, Action::Throttle { factor: 0.5 });
    }

    #[test]
    fn throttled_pattern_cannot_reach_a_dead_node() {
        let net = line(2);
        spread_until_throttled(&net);
        net.set_health(NodeId(1), 0.0).unwrap();

        let result = net
            .transfer(PatternId(9), NodeId(0), NodeId(1), &PatternMetadata::default())
            .unwrap();
        assert_eq!(result.status, TransferStatus::Blocked);
        assert!(!result.throttled);
        assert_eq!(
            result.hazards,
            vec![HazardKind::ViralOverload, HazardKind::UnhealthyEndpoint]
        );
        assert_eq!(result.reason.as_deref(), Some("unhealthy node"));
        assert_eq!(net.action_log(1)[0].hazard, Some(HazardKind::UnhealthyEndpoint));
        assert_eq!(net.find_link(NodeId(0), NodeId(1)).unwrap().history.len(), 3);
    }

    #[test]
    fn throttled_pattern_still_waits_for_budget() {
        let net = line(2);
        spread_until_throttled(&net);
        net.set_budget(NodeId(0), 0.0).unwrap();

        let result = net
            .transfer(PatternId(9), NodeId(0), NodeId(1), &PatternMetadata::default())
            .unwrap();
        assert_eq!(result.status, TransferStatus::Waiting);
        assert_eq!(result.cost, None);
        assert_eq!(
            result.hazards,
            vec![HazardKind::ViralOverload, HazardKind::InsufficientResources]
        );
        assert_eq!(net.node(NodeId(0)).unwrap().resource_budget, 0.0);
        assert_eq!(net.stats().total_transfers, 3);
    }
}

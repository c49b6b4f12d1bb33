//! End-to-end scenarios on a ten-node network.
//!
//! Each scenario grows the network through `add_node`, so every node is
//! auto-connected to up to five peers, then exercises one path through
//! admission control, routing or healing.

use mycel_runtime::prelude::*;

fn grow(net: Network, n: u64) -> Network {
    for id in 0..n {
        net.add_node(NodeId(id), NodeKind::Agent).unwrap();
    }
    net
}

fn seeded(seed: u64) -> Network {
    grow(
        Network::new()
            .with_selector(RandomSelector::seeded(seed))
            .with_link_sampler(RandomLinks::seeded(seed)),
        10,
    )
}

#[test]
fn plain_pattern_reaches_a_neighbor() {
    let net = seeded(1);
    assert_eq!(net.node_count(), 10);

    let result = net
        .transfer(PatternId(1), NodeId(0), NodeId(1), &PatternMetadata::default())
        .unwrap();
    assert_eq!(result.status, TransferStatus::Success);
    assert!(net.node(NodeId(1)).unwrap().hosted_patterns.contains(&PatternId(1)));
}

#[test]
fn sacred_pattern_is_blocked() {
    let net = seeded(2);
    let result = net
        .transfer(PatternId(2), NodeId(0), NodeId(2), &PatternMetadata::sacred())
        .unwrap();
    assert_eq!(result.status, TransferStatus::Blocked);
    assert!(result.reason.unwrap().contains("protected content"));

    let log = net.hazard_log(50);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].hazards, vec![HazardKind::Sacred]);
    assert_eq!(log[0].transfer_id, result.transfer_id);
}

#[test]
fn unlinked_endpoints_route_through_peers() {
    // Each node links to the five ids just below it, so 0 and 9 never meet.
    let net = grow(
        Network::new()
            .with_selector(NearestK)
            .with_link_sampler(FixedLinks::new(0.8, 2.0)),
        10,
    );
    assert!(net.find_link(NodeId(0), NodeId(9)).is_none());

    let result = net
        .transfer(PatternId(3), NodeId(0), NodeId(9), &PatternMetadata::default())
        .unwrap();
    assert_eq!(result.status, TransferStatus::Success);
    let path = result.path.unwrap();
    assert!(path.len() > 2);
    assert_eq!(path, vec![NodeId(0), NodeId(4), NodeId(9)]);
    assert_eq!(result.cost, Some(1.0));
}

#[test]
fn dead_node_is_removed_by_heal() {
    let net = seeded(4);
    net.set_health(NodeId(5), 0.0).unwrap();

    let report = net.heal();
    assert!(report.removed_nodes.contains(&NodeId(5)));
    assert!(!net.contains(NodeId(5)));
    assert!(net.node(NodeId(5)).unwrap_err().is_unknown_node());
    assert!(net
        .links()
        .iter()
        .all(|link| link.from != NodeId(5) && link.to != NodeId(5)));
    assert!(net.nodes().iter().all(|node| !node.neighbors.contains(&NodeId(5))));
}

#[test]
fn exhausted_sender_waits() {
    let net = seeded(5);
    net.set_budget(NodeId(0), 0.0).unwrap();

    let result = net
        .transfer(PatternId(4), NodeId(0), NodeId(1), &PatternMetadata::default())
        .unwrap();
    assert_eq!(result.status, TransferStatus::Waiting);
    assert_eq!(result.hazards, vec![HazardKind::InsufficientResources]);

    // Replenishing lets the same transfer through.
    net.replenish(NodeId(0), 10.0).unwrap();
    let retry = net
        .transfer(PatternId(4), NodeId(0), NodeId(1), &PatternMetadata::default())
        .unwrap();
    assert_eq!(retry.status, TransferStatus::Success);
}

#[test]
fn results_serialize_for_callers() {
    let net = seeded(6);
    let result = net
        .transfer(PatternId(5), NodeId(0), NodeId(1), &PatternMetadata::default())
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "success");

    let stats = serde_json::to_value(net.stats()).unwrap();
    assert_eq!(stats["node_count"], 10);
    assert_eq!(stats["status"], "healthy");
}

//! Invariants under randomized workloads.
//!
//! Each test drives a network with a seeded `StdRng` so failures replay
//! exactly. The loops mix growth, transfers, health changes, clock
//! advances and heals, then check the invariants after every step.

use mycel_runtime::prelude::*;
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashMap};

fn random_network(rng: &mut StdRng, n: u64) -> Network {
    let config = NetworkConfig {
        auto_connect_peers: rng.gen_range(1..=3),
        ..NetworkConfig::default()
    };
    let net = Network::from_config(config)
        .unwrap()
        .with_selector(RandomSelector::seeded(rng.gen()))
        .with_link_sampler(RandomLinks::seeded(rng.gen()));
    for id in 0..n {
        net.add_node(NodeId(id), NodeKind::Agent).unwrap();
    }
    net
}

fn pick_pair(rng: &mut StdRng, ids: &[NodeId]) -> (NodeId, NodeId) {
    let a = ids[rng.gen_range(0..ids.len())];
    loop {
        let b = ids[rng.gen_range(0..ids.len())];
        if b != a {
            return (a, b);
        }
    }
}

fn assert_bounds(net: &Network) {
    for node in net.nodes() {
        assert!((0.0..=1.0).contains(&node.health), "{} health {}", node.id, node.health);
        assert!(node.resource_budget >= 0.0, "{} budget {}", node.id, node.resource_budget);
    }
    for link in net.links() {
        assert!((0.0..=1.0).contains(&link.strength), "strength {}", link.strength);
        assert!(link.bandwidth > 0.0, "bandwidth {}", link.bandwidth);
    }
}

fn assert_referential_integrity(net: &Network) {
    let ids: BTreeSet<NodeId> = net.nodes().iter().map(|n| n.id).collect();
    for link in net.links() {
        assert!(ids.contains(&link.from), "dangling link from {}", link.from);
        assert!(ids.contains(&link.to), "dangling link to {}", link.to);
    }
}

#[test]
fn invariants_hold_under_random_workload() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let net = random_network(&mut rng, 12);
        let mut next_id = 12;

        for step in 0..200 {
            let ids: Vec<NodeId> = net.nodes().iter().map(|n| n.id).collect();
            match rng.gen_range(0..10) {
                0 => {
                    net.add_node(NodeId(next_id), "sensor").unwrap();
                    next_id += 1;
                }
                1 if !ids.is_empty() => {
                    let id = ids[rng.gen_range(0..ids.len())];
                    net.set_health(id, rng.gen_range(-0.5..1.5)).unwrap();
                }
                2 => {
                    net.heal();
                    assert_referential_integrity(&net);
                }
                3 => {
                    net.advance(rng.gen_range(1..30));
                }
                _ if ids.len() >= 2 => {
                    let (from, to) = pick_pair(&mut rng, &ids);
                    let pattern = PatternId(rng.gen_range(0..5));
                    let result = net
                        .transfer(pattern, from, to, &PatternMetadata::default())
                        .unwrap();
                    if let Some(path) = &result.path {
                        assert_eq!(path.first(), Some(&from), "seed {seed} step {step}");
                        assert_eq!(path.last(), Some(&to), "seed {seed} step {step}");
                    }
                }
                _ => {}
            }
            assert_bounds(&net);
        }

        net.heal();
        assert_referential_integrity(&net);
    }
}

#[test]
fn sacred_patterns_are_always_blocked() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let net = random_network(&mut rng, 10);
        for id in 0..10 {
            if rng.gen_bool(0.3) {
                net.set_health(NodeId(id), rng.gen_range(0.0..1.0)).unwrap();
            }
            if rng.gen_bool(0.2) {
                net.set_budget(NodeId(id), rng.gen_range(0.0..2.0)).unwrap();
            }
        }

        let ids: Vec<NodeId> = (0..10).map(NodeId).collect();
        for _ in 0..50 {
            let (from, to) = pick_pair(&mut rng, &ids);
            let result = net
                .transfer(PatternId(rng.gen()), from, to, &PatternMetadata::sacred())
                .unwrap();
            assert_eq!(result.status, TransferStatus::Blocked, "seed {seed}");
            assert_eq!(result.hazards.first(), Some(&HazardKind::Sacred));
        }
        assert_eq!(net.stats().total_transfers, 0);
    }
}

#[test]
fn multi_hop_cost_is_sum_of_inverse_bandwidths() {
    for seed in 0..10 {
        let config = NetworkConfig { auto_connect_peers: 0, ..NetworkConfig::default() };
        let net = Network::from_config(config)
            .unwrap()
            .with_link_sampler(RandomLinks::seeded(seed));
        for id in 0..3 {
            net.add_node(NodeId(id), "agent").unwrap();
        }
        net.connect(NodeId(0), NodeId(1), None).unwrap();
        net.connect(NodeId(1), NodeId(2), None).unwrap();

        let ab = net.find_link(NodeId(0), NodeId(1)).unwrap().bandwidth;
        let bc = net.find_link(NodeId(1), NodeId(2)).unwrap().bandwidth;

        let result = net
            .transfer(PatternId(1), NodeId(0), NodeId(2), &PatternMetadata::default())
            .unwrap();
        assert_eq!(result.path, Some(vec![NodeId(0), NodeId(1), NodeId(2)]));
        let cost = result.cost.unwrap();
        assert!((cost - (1.0 / ab + 1.0 / bc)).abs() < 1e-9, "seed {seed}");
    }
}

#[test]
fn find_path_is_minimal_or_none() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = NetworkConfig { auto_connect_peers: 0, ..NetworkConfig::default() };
        let net = Network::from_config(config)
            .unwrap()
            .with_link_sampler(RandomLinks::seeded(seed));
        let n = 15u64;
        for id in 0..n {
            net.add_node(NodeId(id), "agent").unwrap();
        }
        for _ in 0..rng.gen_range(5..25) {
            let a = rng.gen_range(0..n);
            let b = rng.gen_range(0..n);
            if a != b {
                net.connect(NodeId(a), NodeId(b), None).unwrap();
            }
        }

        // Independent reference distances over the undirected link graph.
        let mut graph = UnGraph::<NodeId, ()>::new_undirected();
        let index: HashMap<NodeId, NodeIndex> =
            (0..n).map(|id| (NodeId(id), graph.add_node(NodeId(id)))).collect();
        for link in net.links() {
            graph.update_edge(index[&link.from], index[&link.to], ());
        }
        let distances = dijkstra(&graph, index[&NodeId(0)], None, |_| 1usize);

        for target in 1..n {
            let path = net.find_path(NodeId(0), NodeId(target)).unwrap();
            match distances.get(&index[&NodeId(target)]) {
                Some(&hops) => {
                    let path = path.expect("reachable target must have a path");
                    assert_eq!(path.len() - 1, hops, "seed {seed} target {target}");
                    for pair in path.windows(2) {
                        assert!(net.find_link(pair[0], pair[1]).is_some());
                    }
                }
                None => assert_eq!(path, None, "seed {seed} target {target}"),
            }
        }
    }
}

#[test]
fn heal_twice_changes_nothing_the_second_time() {
    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let net = random_network(&mut rng, 10);
        let ids: Vec<NodeId> = (0..10).map(NodeId).collect();
        for _ in 0..40 {
            let (from, to) = pick_pair(&mut rng, &ids);
            net.transfer(PatternId(1), from, to, &PatternMetadata::default())
                .unwrap();
        }
        net.set_health(NodeId(3), 0.0).unwrap();

        net.heal();
        let links = net.links().len();
        assert_eq!(net.heal(), HealReport::default(), "seed {seed}");
        assert_eq!(net.links().len(), links);
    }
}

//! Router: fewest-hop paths over the live link graph.
//!
//! Breadth-first search with a FIFO queue. Neighbors are expanded in
//! ascending id order, so among equal-length paths the one that is
//! lexicographically smallest by node id at each step wins. The result is
//! deterministic for a given topology.

use crate::fabric::LinkFabric;
use mycel_core::types::NodeId;
use std::collections::{HashMap, VecDeque};

/// Shortest path from `from` to `to`, inclusive of both ends.
///
/// Returns `[from]` when the endpoints coincide and `None` when they sit
/// in different components (or either is absent from the fabric).
pub fn find_path(fabric: &LinkFabric, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
    if !fabric.contains(from) || !fabric.contains(to) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    let mut parent: HashMap<NodeId, NodeId> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    parent.insert(from, from);

    while let Some(node) = queue.pop_front() {
        for next in fabric.neighbors(node) {
            if parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, node);
            if next == to {
                return Some(reconstruct(&parent, from, to));
            }
            queue.push_back(next);
        }
    }

    None
}

fn reconstruct(parent: &HashMap<NodeId, NodeId>, from: NodeId, to: NodeId) -> Vec<NodeId> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        current = parent[&current];
        path.push(current);
    }
    path.reverse();
    path
}

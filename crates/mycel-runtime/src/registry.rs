//! Node Registry: identity, health, budget and hosted patterns.
//!
//! Each node lives in its own `Arc<Mutex<_>>` cell. The map itself is
//! guarded by the network's registry lock; the cells are what transfers
//! lock to make admission and mutation atomic per node.

use crate::sync::lock;
use mycel_core::error::{MyceliumError, Result};
use mycel_core::types::{Node, NodeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A lockable node.
pub type NodeCell = Arc<Mutex<Node>>;

/// Map from node id to node cell.
#[derive(Default)]
pub struct NodeRegistry {
    nodes: HashMap<NodeId, NodeCell>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Register a node. Fails if the id is taken.
    pub fn insert(&mut self, node: Node) -> Result<NodeCell> {
        if self.nodes.contains_key(&node.id) {
            return Err(MyceliumError::DuplicateNode(node.id));
        }
        let id = node.id;
        let cell = Arc::new(Mutex::new(node));
        self.nodes.insert(id, Arc::clone(&cell));
        Ok(cell)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<NodeCell> {
        self.nodes.remove(&id)
    }

    pub fn get(&self, id: NodeId) -> Result<&NodeCell> {
        self.nodes.get(&id).ok_or(MyceliumError::UnknownNode(id))
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Ids of nodes whose health exceeds `floor`, ascending.
    pub fn healthy_ids(&self, floor: f64) -> Vec<NodeId> {
        self.ids()
            .into_iter()
            .filter(|id| {
                self.nodes
                    .get(id)
                    .map(|cell| lock(cell).health > floor)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Run `f` on one node under its lock.
    pub fn with_node<R>(&self, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> Result<R> {
        let cell = self.get(id)?;
        let mut node = lock(cell);
        Ok(f(&mut node))
    }

    pub fn cells(&self) -> impl Iterator<Item = (&NodeId, &NodeCell)> {
        self.nodes.iter()
    }
}

/// Lock two distinct nodes in ascending id order.
///
/// Returns the guards in argument order so callers never need to know
/// which one was taken first.
pub fn lock_pair<'a>(
    first: (NodeId, &'a NodeCell),
    second: (NodeId, &'a NodeCell),
) -> (MutexGuard<'a, Node>, MutexGuard<'a, Node>) {
    debug_assert_ne!(first.0, second.0, "lock_pair needs distinct nodes");
    if first.0 < second.0 {
        let a = lock(first.1);
        let b = lock(second.1);
        (a, b)
    } else {
        let b = lock(second.1);
        let a = lock(first.1);
        (a, b)
    }
}

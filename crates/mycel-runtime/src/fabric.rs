//! Link Fabric: weighted directed links and their transfer histories.
//!
//! Backed by petgraph's `StableDiGraph`, so node and edge indices survive
//! removals (an arena with stable indices) and removing a node drops every
//! link that touches it. Each link sits in its own `Mutex` so hops on
//! disjoint links commit in parallel under a shared fabric lock.

use crate::sync::{get_mut, lock};
use mycel_core::types::{Link, LinkParams, LinkSnapshot, NodeId, PatternId, Tick};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// The link graph plus the per-pattern spread index.
pub struct LinkFabric {
    graph: StableDiGraph<NodeId, Mutex<Link>>,
    /// Map from our NodeId to petgraph's internal index.
    node_index: HashMap<NodeId, NodeIndex>,
    /// Ticks of committed hops per pattern, oldest first.
    spread: Mutex<HashMap<PatternId, VecDeque<Tick>>>,
}

impl LinkFabric {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_index: HashMap::new(),
            spread: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_node(&mut self, id: NodeId) {
        if !self.node_index.contains_key(&id) {
            let idx = self.graph.add_node(id);
            self.node_index.insert(id, idx);
        }
    }

    /// Remove a node and every link touching it. Returns links dropped.
    pub fn remove_node(&mut self, id: NodeId) -> usize {
        let Some(idx) = self.node_index.remove(&id) else {
            return 0;
        };
        let before = self.graph.edge_count();
        self.graph.remove_node(idx);
        before - self.graph.edge_count()
    }

    /// Create `a -> b` and `b -> a`, keeping any direction that exists.
    ///
    /// An explicit `strength` overwrites the strength of existing entries.
    /// Returns a copy of the `a -> b` link.
    pub fn connect(
        &mut self,
        a: NodeId,
        b: NodeId,
        params: LinkParams,
        strength: Option<f64>,
    ) -> Option<Link> {
        let a_idx = *self.node_index.get(&a)?;
        let b_idx = *self.node_index.get(&b)?;
        let params = LinkParams {
            strength: strength.unwrap_or(params.strength),
            ..params
        };

        for (from, to, from_idx, to_idx) in [(a, b, a_idx, b_idx), (b, a, b_idx, a_idx)] {
            match self.graph.find_edge(from_idx, to_idx) {
                Some(edge) => {
                    if let (Some(s), Some(cell)) = (strength, self.graph.edge_weight_mut(edge)) {
                        get_mut(cell).strength = s;
                    }
                }
                None => {
                    self.graph
                        .add_edge(from_idx, to_idx, Mutex::new(Link::new(from, to, params)));
                }
            }
        }

        self.link(a, b).map(|cell| lock(cell).clone())
    }

    /// The directed link `from -> to`.
    pub fn link(&self, from: NodeId, to: NodeId) -> Option<&Mutex<Link>> {
        let from_idx = self.node_index.get(&from)?;
        let to_idx = self.node_index.get(&to)?;
        let edge = self.graph.find_edge(*from_idx, *to_idx)?;
        self.graph.edge_weight(edge)
    }

    /// A link between `a` and `b` in either direction, `a -> b` first.
    pub fn find_link(&self, a: NodeId, b: NodeId) -> Option<&Mutex<Link>> {
        self.link(a, b).or_else(|| self.link(b, a))
    }

    /// Live neighbor set of a node in ascending id order.
    ///
    /// A peer counts as a neighbor if a link exists in either direction.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.node_index.get(&id) else {
            return Vec::new();
        };
        let mut peers: Vec<NodeId> = self
            .graph
            .neighbors_undirected(idx)
            .map(|peer| self.graph[peer])
            .collect();
        peers.sort();
        peers.dedup();
        peers
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Directed link entries.
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn snapshots(&self) -> Vec<LinkSnapshot> {
        let mut links: Vec<LinkSnapshot> = self
            .graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_weight(edge))
            .map(|cell| LinkSnapshot::from(&*lock(cell)))
            .collect();
        links.sort_by_key(|link| (link.from, link.to));
        links
    }

    /// Whether any link names `id` as an endpoint.
    pub fn any_link_touches(&self, id: NodeId) -> bool {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_weight(edge))
            .any(|cell| lock(cell).touches(id))
    }

    /// Drop every link at or below `threshold`. Returns links dropped.
    pub fn prune(&mut self, threshold: f64) -> usize {
        let weak: Vec<_> = self
            .graph
            .edge_indices()
            .filter(|&edge| {
                self.graph
                    .edge_weight(edge)
                    .map(|cell| lock(cell).strength <= threshold)
                    .unwrap_or(false)
            })
            .collect();
        for edge in &weak {
            self.graph.remove_edge(*edge);
        }
        weak.len()
    }

    /// Bounded Hebbian reinforcement of heavily used links.
    ///
    /// A link is reinforced when its history exceeds `after` entries and
    /// has grown since it was last reinforced. Returns links reinforced.
    pub fn reinforce(&mut self, after: usize, factor: f64) -> usize {
        let edges: Vec<_> = self.graph.edge_indices().collect();
        let mut reinforced = 0;
        for edge in edges {
            let Some(cell) = self.graph.edge_weight_mut(edge) else {
                continue;
            };
            let link = get_mut(cell);
            let used = link.history.len();
            if used > after && used > link.reinforced_at {
                link.strength = (link.strength * factor).min(1.0);
                link.reinforced_at = used;
                reinforced += 1;
            }
        }
        reinforced
    }

    /// Index a committed hop of `pattern` at `tick`.
    pub fn note_spread(&self, pattern: PatternId, tick: Tick) {
        lock(&self.spread).entry(pattern).or_default().push_back(tick);
    }

    /// Committed hops of `pattern` with `now - tick < window`.
    pub fn recent_spread(&self, pattern: PatternId, now: Tick, window: Tick) -> usize {
        let mut spread = lock(&self.spread);
        let Some(ticks) = spread.get_mut(&pattern) else {
            return 0;
        };
        while ticks.front().is_some_and(|&t| now.saturating_sub(t) >= window) {
            ticks.pop_front();
        }
        // Concurrent commits may append slightly out of order.
        ticks
            .iter()
            .filter(|&&t| now.saturating_sub(t) < window)
            .count()
    }

    /// Drop spread entries that fell out of `window`, and patterns left
    /// without any. Returns the number of patterns dropped.
    pub fn expire_spread(&mut self, now: Tick, window: Tick) -> usize {
        let spread = get_mut(&mut self.spread);
        let before = spread.len();
        spread.retain(|_, ticks| {
            ticks.retain(|&t| now.saturating_sub(t) < window);
            !ticks.is_empty()
        });
        before - spread.len()
    }

    #[cfg(test)]
    pub(crate) fn spread_len(&self) -> usize {
        lock(&self.spread).len()
    }
}

impl Default for LinkFabric {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(strength: f64) -> LinkParams {
        LinkParams { strength, bandwidth: 2.0 }
    }

    fn fabric(n: u64) -> LinkFabric {
        let mut fabric = LinkFabric::new();
        for id in 0..n {
            fabric.add_node(NodeId(id));
        }
        fabric
    }

    #[test]
    fn connect_creates_both_directions() {
        let mut fabric = fabric(2);
        let link = fabric.connect(NodeId(0), NodeId(1), params(0.7), None).unwrap();
        assert_eq!((link.from, link.to), (NodeId(0), NodeId(1)));
        assert_eq!(fabric.link_count(), 2);
        assert!(fabric.link(NodeId(1), NodeId(0)).is_some());
    }

    #[test]
    fn reconnect_keeps_pair_unique() {
        let mut fabric = fabric(2);
        fabric.connect(NodeId(0), NodeId(1), params(0.7), None);
        let link = fabric
            .connect(NodeId(1), NodeId(0), params(0.9), Some(0.3))
            .unwrap();
        assert_eq!(fabric.link_count(), 2);
        assert_eq!(link.strength, 0.3);
    }

    #[test]
    fn connect_unknown_endpoint_returns_none() {
        let mut fabric = fabric(1);
        assert!(fabric.connect(NodeId(0), NodeId(5), params(0.7), None).is_none());
        assert_eq!(fabric.link_count(), 0);
    }

    #[test]
    fn find_link_checks_reverse_direction() {
        let mut fabric = fabric(2);
        fabric.connect(NodeId(0), NodeId(1), params(0.7), None);
        // Leave only 1 -> 0 standing.
        lock(fabric.link(NodeId(0), NodeId(1)).unwrap()).strength = 0.05;
        assert_eq!(fabric.prune(0.1), 1);

        let link = fabric.find_link(NodeId(0), NodeId(1)).unwrap();
        assert_eq!(lock(link).from, NodeId(1));
        assert_eq!(fabric.neighbors(NodeId(0)), vec![NodeId(1)]);
    }

    #[test]
    fn removing_a_node_drops_its_links() {
        let mut fabric = fabric(3);
        fabric.connect(NodeId(0), NodeId(1), params(0.7), None);
        fabric.connect(NodeId(1), NodeId(2), params(0.7), None);
        assert_eq!(fabric.remove_node(NodeId(1)), 4);
        assert_eq!(fabric.link_count(), 0);
        assert!(!fabric.any_link_touches(NodeId(1)));
    }

    #[test]
    fn reinforcement_waits_for_new_traffic() {
        let mut fabric = fabric(2);
        fabric.connect(NodeId(0), NodeId(1), params(0.5), None);
        {
            let mut link = lock(fabric.link(NodeId(0), NodeId(1)).unwrap());
            for tick in 0..11 {
                link.history.push(mycel_core::types::TransferRecord {
                    tick,
                    pattern_id: PatternId(1),
                    metadata: Default::default(),
                });
            }
        }
        assert_eq!(fabric.reinforce(10, 1.1), 1);
        assert_eq!(fabric.reinforce(10, 1.1), 0);
        let strength = lock(fabric.link(NodeId(0), NodeId(1)).unwrap()).strength;
        assert!((strength - 0.55).abs() < 1e-9);
    }

    #[test]
    fn spread_window_forgets_old_hops() {
        let fabric = fabric(0);
        fabric.note_spread(PatternId(1), 0);
        fabric.note_spread(PatternId(1), 10);
        fabric.note_spread(PatternId(1), 30);
        assert_eq!(fabric.recent_spread(PatternId(1), 30, 24), 2);
        assert_eq!(fabric.recent_spread(PatternId(1), 60, 24), 0);
        assert_eq!(fabric.recent_spread(PatternId(2), 60, 24), 0);
    }

    #[test]
    fn expired_spread_entries_are_dropped() {
        let mut fabric = fabric(0);
        fabric.note_spread(PatternId(1), 0);
        fabric.note_spread(PatternId(2), 5);
        fabric.note_spread(PatternId(2), 20);
        assert_eq!(fabric.spread_len(), 2);

        assert_eq!(fabric.expire_spread(30, 24), 1);
        assert_eq!(fabric.spread_len(), 1);
        assert_eq!(fabric.recent_spread(PatternId(2), 30, 24), 1);

        assert_eq!(fabric.expire_spread(60, 24), 1);
        assert_eq!(fabric.spread_len(), 0);
    }
}

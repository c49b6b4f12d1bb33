//! The aggregate root of a resident network.
//!
//! Owns the node registry, the link fabric, the growth strategies, the
//! control points and the journal. There is no global instance: construct
//! one and pass it (typically as `Arc<Network>`) to whoever needs it.
//!
//! Transfers live in [`crate::transfer`], topology maintenance in
//! [`crate::topology`] and statistics in [`crate::stats`]; they are all
//! methods on this type.

use crate::fabric::LinkFabric;
use crate::journal::Journal;
use crate::registry::NodeRegistry;
use crate::router;
use crate::sync::{lock, read, write};
use mycel_core::admission::{ActionRecord, HazardEvent};
use mycel_core::config::NetworkConfig;
use mycel_core::error::{MyceliumError, Result};
use mycel_core::selection::{LinkSampler, PeerSelector, RandomLinks, RandomSelector};
use mycel_core::types::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// A resident, mutable pattern-dissemination network.
pub struct Network {
    pub(crate) config: NetworkConfig,
    pub(crate) clock: AtomicU64,
    pub(crate) registry: RwLock<NodeRegistry>,
    pub(crate) fabric: RwLock<LinkFabric>,
    pub(crate) selector: Mutex<Box<dyn PeerSelector>>,
    pub(crate) sampler: Mutex<Box<dyn LinkSampler>>,
    pub(crate) journal: Journal,
}

impl Network {
    /// Create a network with default configuration and random growth.
    pub fn new() -> Self {
        Self::build(NetworkConfig::default())
    }

    /// Create a network with the specified configuration.
    pub fn from_config(config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: NetworkConfig) -> Self {
        Self {
            config,
            clock: AtomicU64::new(0),
            registry: RwLock::new(NodeRegistry::new()),
            fabric: RwLock::new(LinkFabric::new()),
            selector: Mutex::new(Box::new(RandomSelector::new())),
            sampler: Mutex::new(Box::new(RandomLinks::new())),
            journal: Journal::new(),
        }
    }

    /// Replace the peer selection strategy.
    pub fn with_selector(self, selector: impl PeerSelector + 'static) -> Self {
        *lock(&self.selector) = Box::new(selector);
        self
    }

    /// Replace the link parameter sampler.
    pub fn with_link_sampler(self, sampler: impl LinkSampler + 'static) -> Self {
        *lock(&self.sampler) = Box::new(sampler);
        self
    }

    /// The critical control points and tuning in effect.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Current logical time.
    pub fn now(&self) -> Tick {
        self.clock.load(Ordering::SeqCst)
    }

    /// Advance the logical clock. Returns the new time.
    pub fn advance(&self, ticks: Tick) -> Tick {
        self.clock.fetch_add(ticks, Ordering::SeqCst) + ticks
    }

    /// Register a node and auto-connect it to up to
    /// `auto_connect_peers` healthy peers.
    pub fn add_node(&self, id: NodeId, kind: impl Into<NodeKind>) -> Result<NodeSnapshot> {
        let mut registry = write(&self.registry);
        let mut fabric = write(&self.fabric);

        let node = Node::new(id, kind.into(), self.config.initial_resource_budget, self.now());
        registry.insert(node)?;
        fabric.add_node(id);

        let linked =
            self.auto_connect_locked(&registry, &mut fabric, id, self.config.auto_connect_peers);
        info!(node = %id, links = linked.len(), "node joined");

        snapshot_locked(&registry, &fabric, id)
    }

    /// Remove a node and every link touching it.
    pub fn remove_node(&self, id: NodeId) -> Result<()> {
        let mut registry = write(&self.registry);
        let mut fabric = write(&self.fabric);

        registry.remove(id).ok_or(MyceliumError::UnknownNode(id))?;
        let dropped = fabric.remove_node(id);
        self.journal.retain_quarantine(|q| q != id);
        info!(node = %id, links = dropped, "node removed");
        Ok(())
    }

    /// Link `a` and `b` in both directions.
    ///
    /// Without an explicit strength the sampler decides. Returns the
    /// `a -> b` link.
    pub fn connect(&self, a: NodeId, b: NodeId, strength: Option<f64>) -> Result<Link> {
        if let Some(s) = strength {
            if !(0.0..=1.0).contains(&s) {
                return Err(MyceliumError::InvalidStrength(s));
            }
        }
        if a == b {
            return Err(MyceliumError::SelfConnection(a));
        }

        let registry = read(&self.registry);
        registry.get(a)?;
        registry.get(b)?;

        let mut fabric = write(&self.fabric);
        let params = self.sample_link();
        let link = fabric
            .connect(a, b, params, strength)
            .ok_or(MyceliumError::UnknownNode(a))?;
        debug!(from = %a, to = %b, strength = link.strength, "connected");
        Ok(link)
    }

    /// A link between `a` and `b`, checking `a -> b` then `b -> a`.
    pub fn find_link(&self, a: NodeId, b: NodeId) -> Option<Link> {
        let fabric = read(&self.fabric);
        fabric.find_link(a, b).map(|cell| lock(cell).clone())
    }

    /// Fewest-hop path between two registered nodes.
    pub fn find_path(&self, from: NodeId, to: NodeId) -> Result<Option<Vec<NodeId>>> {
        let registry = read(&self.registry);
        registry.get(from)?;
        registry.get(to)?;
        let fabric = read(&self.fabric);
        Ok(router::find_path(&fabric, from, to))
    }

    /// Set a node's health, clamped to `[0, 1]`. Returns the stored value.
    pub fn set_health(&self, id: NodeId, health: f64) -> Result<f64> {
        if health.is_nan() {
            return Err(MyceliumError::InvalidValue { field: "health", value: health });
        }
        let registry = read(&self.registry);
        registry.with_node(id, |node| {
            node.health = health.clamp(0.0, 1.0);
            node.health
        })
    }

    /// Add to a node's resource budget. Returns the new budget.
    pub fn replenish(&self, id: NodeId, amount: f64) -> Result<f64> {
        check_amount("replenish amount", amount)?;
        let registry = read(&self.registry);
        registry.with_node(id, |node| {
            node.resource_budget += amount;
            node.resource_budget
        })
    }

    /// Overwrite a node's resource budget.
    pub fn set_budget(&self, id: NodeId, amount: f64) -> Result<f64> {
        check_amount("resource budget", amount)?;
        let registry = read(&self.registry);
        registry.with_node(id, |node| {
            node.resource_budget = amount;
            node.resource_budget
        })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        read(&self.registry).contains(id)
    }

    pub fn node_count(&self) -> usize {
        read(&self.registry).len()
    }

    pub fn link_count(&self) -> usize {
        read(&self.fabric).link_count()
    }

    pub fn node(&self, id: NodeId) -> Result<NodeSnapshot> {
        let registry = read(&self.registry);
        let fabric = read(&self.fabric);
        snapshot_locked(&registry, &fabric, id)
    }

    /// Every node, ascending by id.
    pub fn nodes(&self) -> Vec<NodeSnapshot> {
        let registry = read(&self.registry);
        let fabric = read(&self.fabric);
        registry
            .ids()
            .into_iter()
            .filter_map(|id| snapshot_locked(&registry, &fabric, id).ok())
            .collect()
    }

    /// Every directed link, ascending by endpoints.
    pub fn links(&self) -> Vec<LinkSnapshot> {
        read(&self.fabric).snapshots()
    }

    /// Whether any link names `id` as an endpoint.
    pub fn is_referenced(&self, id: NodeId) -> bool {
        read(&self.fabric).any_link_touches(id)
    }

    /// The most recent `limit` hazard events, oldest first.
    pub fn hazard_log(&self, limit: usize) -> Vec<HazardEvent> {
        self.journal.hazard_log(limit)
    }

    /// The most recent `limit` corrective actions, oldest first.
    pub fn action_log(&self, limit: usize) -> Vec<ActionRecord> {
        self.journal.action_log(limit)
    }

    pub fn quarantined(&self) -> Vec<NodeId> {
        self.journal.quarantined()
    }

    /// Draw parameters for a new link pair, keeping bandwidth positive.
    pub(crate) fn sample_link(&self) -> LinkParams {
        let params = lock(&self.sampler).sample();
        if params.bandwidth.is_finite() && params.bandwidth > 0.0 {
            params
        } else {
            warn!(bandwidth = params.bandwidth, "sampler produced invalid bandwidth, using 1.0");
            LinkParams { bandwidth: 1.0, ..params }
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn snapshot_locked(
    registry: &NodeRegistry,
    fabric: &LinkFabric,
    id: NodeId,
) -> Result<NodeSnapshot> {
    let node = lock(registry.get(id)?).clone();
    Ok(NodeSnapshot {
        id: node.id,
        kind: node.kind,
        health: node.health,
        resource_budget: node.resource_budget,
        neighbors: fabric.neighbors(id),
        hosted_patterns: node.hosted_patterns.keys().copied().collect(),
        last_active: node.last_active,
    })
}

fn check_amount(field: &'static str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(MyceliumError::InvalidValue { field, value: amount });
    }
    Ok(())
}

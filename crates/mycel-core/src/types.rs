//! Shared types used across all Mycel crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// The logical clock of a network. All timestamps are ticks.
pub type Tick = u64;

/// Caller-supplied identifier of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Identifier of an opaque pattern. Content is never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternId(pub u64);

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern-{}", self.0)
    }
}

/// Correlates every hazard event and corrective action produced by one
/// `Transfer` call, across all of its hops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(pub Uuid);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

/// Informational tag describing what a node stands for.
///
/// Serialized as its plain tag, so `"drone"` round-trips as a custom kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum NodeKind {
    User,
    Agent,
    Sensor,
    /// Any other tag supplied by the caller.
    Custom(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::User => "user",
            NodeKind::Agent => "agent",
            NodeKind::Sensor => "sensor",
            NodeKind::Custom(tag) => tag,
        }
    }
}

impl From<&str> for NodeKind {
    fn from(tag: &str) -> Self {
        match tag {
            "user" => NodeKind::User,
            "agent" => NodeKind::Agent,
            "sensor" => NodeKind::Sensor,
            other => NodeKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        NodeKind::from(tag.as_str())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Custom(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata travelling with a pattern.
///
/// Only `sacred` is interpreted; everything else is carried verbatim into
/// link histories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternMetadata {
    #[serde(default)]
    pub sacred: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PatternMetadata {
    /// Metadata for protected content.
    pub fn sacred() -> Self {
        Self {
            sacred: true,
            extra: serde_json::Map::new(),
        }
    }

    /// Attach an arbitrary field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A vertex of the network: an agent that hosts and relays patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Vitality in `[0, 1]`. At `<= 0` the node is removed by the next heal.
    pub health: f64,
    /// Consumed by outgoing transfers, replenished externally. Never negative.
    pub resource_budget: f64,
    /// Hosted patterns and the tick each was received.
    pub hosted_patterns: BTreeMap<PatternId, Tick>,
    pub last_active: Tick,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, resource_budget: f64, now: Tick) -> Self {
        Self {
            id,
            kind,
            health: 1.0,
            resource_budget,
            hosted_patterns: BTreeMap::new(),
            last_active: now,
        }
    }

    /// Whether the node is dead and awaiting removal.
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn hosts(&self, pattern: PatternId) -> bool {
        self.hosted_patterns.contains_key(&pattern)
    }
}

/// One committed hop, appended to the link it crossed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub tick: Tick,
    pub pattern_id: PatternId,
    pub metadata: PatternMetadata,
}

/// Strength and bandwidth assigned to a freshly grown link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkParams {
    pub strength: f64,
    pub bandwidth: f64,
}

/// A directed connection `from -> to`. Links are created in pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    /// Connection quality in `[0, 1]`.
    pub strength: f64,
    /// Patterns per tick; always `> 0`.
    pub bandwidth: f64,
    /// Append-only record of committed hops.
    pub history: Vec<TransferRecord>,
    /// History length at the last reinforcement.
    pub reinforced_at: usize,
}

impl Link {
    pub fn new(from: NodeId, to: NodeId, params: LinkParams) -> Self {
        Self {
            from,
            to,
            strength: params.strength.clamp(0.0, 1.0),
            bandwidth: params.bandwidth,
            history: Vec::new(),
            reinforced_at: 0,
        }
    }

    /// Resource cost of one hop at the given throttle factor (1.0 = none).
    pub fn cost(&self, throttle: f64) -> f64 {
        1.0 / (self.bandwidth * throttle)
    }

    pub fn last_transfer(&self) -> Option<&TransferRecord> {
        self.history.last()
    }

    /// Whether the link touches `node` at either end.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}

/// Read-only view of a node, including its derived neighbor set.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub kind: NodeKind,
    pub health: f64,
    pub resource_budget: f64,
    pub neighbors: Vec<NodeId>,
    pub hosted_patterns: Vec<PatternId>,
    pub last_active: Tick,
}

/// Read-only view of a link.
#[derive(Debug, Clone, Serialize)]
pub struct LinkSnapshot {
    pub from: NodeId,
    pub to: NodeId,
    pub strength: f64,
    pub bandwidth: f64,
    pub transfer_count: usize,
    pub last_transfer: Option<TransferRecord>,
}

impl From<&Link> for LinkSnapshot {
    fn from(link: &Link) -> Self {
        Self {
            from: link.from,
            to: link.to,
            strength: link.strength,
            bandwidth: link.bandwidth,
            transfer_count: link.history.len(),
            last_transfer: link.last_transfer().cloned(),
        }
    }
}

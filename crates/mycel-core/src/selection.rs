//! Pluggable growth strategies.
//!
//! New links are grown in two random steps: choosing which peers a node
//! connects to, and drawing the initial strength and bandwidth of each
//! link. Both are traits so tests can swap the randomness for fixed,
//! reproducible topologies.

use crate::types::{LinkParams, NodeId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Chooses up to `k` peers for a node out of eligible candidates.
///
/// Candidates are passed in ascending id order and never include `node`
/// itself or its existing neighbors.
pub trait PeerSelector: Send {
    fn select(&mut self, node: NodeId, candidates: &[NodeId], k: usize) -> Vec<NodeId>;
}

/// Uniform random sample without replacement. The default strategy.
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible selection from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerSelector for RandomSelector {
    fn select(&mut self, _node: NodeId, candidates: &[NodeId], k: usize) -> Vec<NodeId> {
        candidates
            .choose_multiple(&mut self.rng, k)
            .copied()
            .collect()
    }
}

/// Deterministic: the `k` lowest ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstK;

impl PeerSelector for FirstK {
    fn select(&mut self, _node: NodeId, candidates: &[NodeId], k: usize) -> Vec<NodeId> {
        candidates.iter().take(k).copied().collect()
    }
}

/// Deterministic: the `k` ids closest to the joining node's id.
///
/// Nodes added in id order grow a lattice where node `i` links to
/// `i-1 ..= i-k`, which keeps far-apart ids multiple hops away.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestK;

impl PeerSelector for NearestK {
    fn select(&mut self, node: NodeId, candidates: &[NodeId], k: usize) -> Vec<NodeId> {
        let mut ranked: Vec<NodeId> = candidates.to_vec();
        ranked.sort_by_key(|peer| (peer.0.abs_diff(node.0), peer.0));
        ranked.truncate(k);
        ranked
    }
}

/// Draws the initial parameters of a new link pair.
pub trait LinkSampler: Send {
    fn sample(&mut self) -> LinkParams;
}

/// Strength in `[0.5, 1.0]`, bandwidth in `[1.0, 5.0]`. The default sampler.
pub struct RandomLinks {
    rng: StdRng,
}

impl RandomLinks {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomLinks {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkSampler for RandomLinks {
    fn sample(&mut self) -> LinkParams {
        LinkParams {
            strength: self.rng.gen_range(0.5..=1.0),
            bandwidth: self.rng.gen_range(1.0..=5.0),
        }
    }
}

/// Every link gets the same parameters.
#[derive(Debug, Clone, Copy)]
pub struct FixedLinks(pub LinkParams);

impl FixedLinks {
    pub fn new(strength: f64, bandwidth: f64) -> Self {
        Self(LinkParams { strength, bandwidth })
    }
}

impl LinkSampler for FixedLinks {
    fn sample(&mut self) -> LinkParams {
        self.0
    }
}

//! CLI command implementations.

pub mod init;
pub mod simulate;
pub mod stats;

use crate::config::Config;
use anyhow::{Context, Result};
use mycel::prelude::*;

/// Build a network from config, seeding its growth strategies when asked.
pub fn build_network(config: &Config, seed: Option<u64>) -> Result<Network> {
    let network = Network::from_config(config.network.clone()).context("Invalid network config")?;
    Ok(match seed {
        Some(seed) => network
            .with_selector(RandomSelector::seeded(seed))
            .with_link_sampler(RandomLinks::seeded(seed.wrapping_add(1))),
        None => network,
    })
}

/// Add nodes `0..count`, cycling through the built-in kinds.
pub fn populate(network: &Network, count: u64) -> Result<()> {
    const KINDS: [NodeKind; 3] = [NodeKind::User, NodeKind::Agent, NodeKind::Sensor];
    for id in 0..count {
        let kind = KINDS[(id % 3) as usize].clone();
        network
            .add_node(NodeId(id), kind)
            .with_context(|| format!("Failed to add node {id}"))?;
    }
    Ok(())
}

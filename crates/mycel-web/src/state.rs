//! Application state for the web server.

use mycel::prelude::*;
use std::sync::Arc;

/// Shared application state.
///
/// `Network` is `Send + Sync` and does its own locking, so handlers call
/// it directly through the `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub network: Arc<Network>,
}

impl AppState {
    pub fn new(network: Network) -> Self {
        Self {
            network: Arc::new(network),
        }
    }

    /// A network pre-populated with `nodes` user nodes, ids `0..nodes`.
    pub fn seeded(config: NetworkConfig, nodes: u64) -> Result<Self> {
        let network = Network::from_config(config)?;
        for id in 0..nodes {
            network.add_node(NodeId(id), NodeKind::User)?;
        }
        Ok(Self::new(network))
    }
}

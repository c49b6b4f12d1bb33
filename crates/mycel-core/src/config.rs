//! Critical control points and topology tuning.

use crate::error::{ConfigError, MyceliumError, Result};
use crate::types::Tick;
use serde::{Deserialize, Serialize};

/// Configuration for a network.
///
/// Every field has a serde default so partial TOML/JSON documents load
/// cleanly. Use [`NetworkConfig::validate`] before handing a loaded
/// config to a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Transfers of one pattern per node, within the window, above which
    /// the pattern is throttled (default: 0.85).
    pub max_viral_rate: f64,
    /// Width of the viral-rate window in ticks (default: 24).
    pub viral_window: Tick,
    /// Transfers that must occur in the window before the rate counts (default: 0).
    pub viral_min_transfers: usize,
    /// Bandwidth factor applied to throttled hops (default: 0.5).
    pub throttle_factor: f64,
    /// Health floor for endpoints and auto-connect candidates (default: 0.3).
    pub min_node_health: f64,
    /// Budget a sender needs to originate a hop (default: 1.0).
    pub min_resource_budget: f64,
    /// Budget of a freshly added node (default: 100.0).
    pub initial_resource_budget: f64,
    /// Ticks a hosted pattern lives before heal expires it (default: 90).
    pub max_pattern_age: Tick,
    /// Enforce the protected-content rule (default: true).
    pub sacred_protection: bool,
    /// Peers linked when a node joins (default: 5).
    pub auto_connect_peers: usize,
    /// Peers linked when heal repairs a node (default: 3).
    pub repair_peers: usize,
    /// Nodes with fewer links than this are repaired (default: 2).
    pub min_links: usize,
    /// Links at or below this strength are pruned (default: 0.1).
    pub prune_threshold: f64,
    /// History length a link must exceed to be reinforced (default: 10).
    pub reinforce_after: usize,
    /// Multiplicative reinforcement, capped at 1.0 (default: 1.1).
    pub reinforce_factor: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_viral_rate: 0.85,
            viral_window: 24,
            viral_min_transfers: 0,
            throttle_factor: 0.5,
            min_node_health: 0.3,
            min_resource_budget: 1.0,
            initial_resource_budget: 100.0,
            max_pattern_age: 90,
            sacred_protection: true,
            auto_connect_peers: 5,
            repair_peers: 3,
            min_links: 2,
            prune_threshold: 0.1,
            reinforce_after: 10,
            reinforce_factor: 1.1,
        }
    }
}

impl NetworkConfig {
    /// Check every threshold against its legal range.
    pub fn validate(&self) -> Result<()> {
        check_range("max_viral_rate", self.max_viral_rate, 0.0, f64::MAX)?;
        check_range("throttle_factor", self.throttle_factor, f64::MIN_POSITIVE, 1.0)?;
        check_range("min_node_health", self.min_node_health, 0.0, 1.0)?;
        check_range("min_resource_budget", self.min_resource_budget, 0.0, f64::MAX)?;
        check_range("initial_resource_budget", self.initial_resource_budget, 0.0, f64::MAX)?;
        check_range("prune_threshold", self.prune_threshold, 0.0, 1.0)?;
        check_range("reinforce_factor", self.reinforce_factor, 1.0, f64::MAX)?;
        if self.viral_window == 0 {
            return Err(MyceliumError::Config(ConfigError::InvalidValue {
                field: "viral_window".into(),
                value: "0".into(),
                reason: "window must span at least one tick".into(),
            }));
        }
        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(MyceliumError::Config(ConfigError::OutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        }));
    }
    Ok(())
}

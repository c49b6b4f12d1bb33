//! Configuration management for the Mycel CLI.

use anyhow::{Context, Result};
use mycel::prelude::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for in the current and parent directories.
pub const CONFIG_FILE: &str = "mycel.toml";

/// Mycel project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_nodes")]
    pub nodes: u64,
    #[serde(default = "default_transfers")]
    pub transfers: u64,
    /// Fixed seed for reproducible runs. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_nodes() -> u64 { 10 }
fn default_transfers() -> u64 { 100 }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            transfers: default_transfers(),
            seed: None,
        }
    }
}

impl Config {
    /// Load config from mycel.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::from_file(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
        config.network.validate()?;
        Ok(config)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find mycel.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

//! Watcher configuration

use anyhow::{Context, Result};
use pyth_layout::Pubkey;
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use std::str::FromStr;

use crate::cluster::Cluster;

/// How the watcher reads prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fetch a full snapshot every `poll_interval_secs`
    Poll,
    /// Stream live account updates
    Stream,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC URL for Solana cluster
    pub rpc_url: String,

    /// WebSocket URL for account and slot subscriptions
    pub ws_url: String,

    /// Oracle program ID
    #[serde(with = "pubkey_string")]
    pub program_key: Pubkey,

    /// Commitment level: processed, confirmed or finalized
    pub commitment: String,

    pub mode: Mode,

    /// Polling interval in seconds (poll mode)
    pub poll_interval_secs: u64,

    /// Price accounts to report; empty means all
    #[serde(default, with = "pubkey_strings")]
    pub feeds: Vec<Pubkey>,

    /// Log account keys and slots alongside prices
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PYTH_CONFIG")
            .unwrap_or_else(|_| "pyth-config.toml".to_string());

        let config_str = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        Self::from_toml(&config_str)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        toml::from_str(config_str).context("Failed to parse config TOML")
    }

    /// Default configuration for a cluster
    pub fn default_for(cluster: Cluster) -> Self {
        Self {
            rpc_url: cluster.rpc_url(),
            ws_url: cluster.ws_url(),
            program_key: cluster.program_key(),
            commitment: "finalized".to_string(),
            mode: Mode::Stream,
            poll_interval_secs: 5,
            feeds: Vec::new(),
            verbose: false,
        }
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|e| anyhow::anyhow!("Invalid commitment {:?}: {}", self.commitment, e))
    }

    /// Write default config to file
    pub fn write_default(path: &str, cluster: Cluster) -> Result<()> {
        let config = Self::default_for(cluster);
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}

mod pubkey_string {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Pubkey, D::Error> {
        let raw = String::deserialize(d)?;
        Pubkey::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

mod pubkey_strings {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(keys: &[Pubkey], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(keys.iter().map(|k| k.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Pubkey>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|raw| Pubkey::from_str(raw).map_err(serde::de::Error::custom))
            .collect()
    }
}

//! Known clusters and the oracle program deployed on each

use std::fmt;
use std::str::FromStr;

use pyth_layout::Pubkey;
use serde::{Deserialize, Serialize};

const MAINNET_BETA_PROGRAM: Pubkey = Pubkey::from_str_const("FsJ3A3u2vn5cTVofAjvy6y5kwABJAqYWpe4975bi2epH");
const DEVNET_PROGRAM: Pubkey = Pubkey::from_str_const("gSbePebfvPy7tRqimPoVecS2UsBvYv46ynrzWocc92s");
const TESTNET_PROGRAM: Pubkey = Pubkey::from_str_const("8tfDNiaEyrV6Q1U4DEXrEigs9DoDtkugzFbybENEbCDz");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    MainnetBeta,
    Devnet,
    Testnet,
}

impl Cluster {
    pub const ALL: [Cluster; 3] = [Cluster::MainnetBeta, Cluster::Devnet, Cluster::Testnet];

    pub fn name(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
        }
    }

    /// Oracle program key on this cluster
    pub fn program_key(&self) -> Pubkey {
        match self {
            Cluster::MainnetBeta => MAINNET_BETA_PROGRAM,
            Cluster::Devnet => DEVNET_PROGRAM,
            Cluster::Testnet => TESTNET_PROGRAM,
        }
    }

    pub fn rpc_url(&self) -> String {
        format!("https://api.{}.solana.com", self.name())
    }

    pub fn ws_url(&self) -> String {
        format!("wss://api.{}.solana.com", self.name())
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cluster {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cluster::ALL
            .into_iter()
            .find(|cluster| cluster.name() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Cluster::ALL.iter().map(Cluster::name).collect();
                anyhow::anyhow!("Invalid Solana cluster name: {}. Valid options are: {:?}", s, valid)
            })
    }
}

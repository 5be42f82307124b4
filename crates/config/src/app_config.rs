// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::OsDirs;
use crate::rpc::RpcUrl;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const HARDHAT_CHAIN_ID: u64 = 31337;
pub const HARDHAT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_DURATION_DAYS: u64 = 365;
pub const DEFAULT_EXPIRY_MARGIN_SECS: u64 = 300;
pub const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 10_000;

/// How long freshly signed decryption authorizations live and how early a cached one is
/// treated as stale.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct SignatureConfig {
    /// Validity window requested when signing a new authorization
    pub duration_days: u64,
    /// A cached authorization is ignored once fewer than this many seconds remain
    pub expiry_margin_secs: u64,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            duration_days: DEFAULT_DURATION_DAYS,
            expiry_margin_secs: DEFAULT_EXPIRY_MARGIN_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Keep signatures and public keys in memory only
    pub in_memory: bool,
    /// Location of the sled database when `in_memory` is false
    pub db_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            in_memory: true,
            db_path: None,
        }
    }
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| OsDirs::data_dir().join("db"))
    }
}

/// The client configuration as loaded from `fhevm.config.yaml` and the environment
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct FhevmConfig {
    /// JSON-RPC endpoint of the chain hosting the FHE contracts
    pub rpc_url: Option<String>,
    /// Expected chain id. Takes precedence over whatever the endpoint reports.
    pub chain_id: Option<u64>,
    /// Chains served by a local FHE-mock-capable dev node keyed by chain id
    pub mock_chains: BTreeMap<String, String>,
    /// Upper bound for the chain id query
    pub resolve_timeout_ms: u64,
    pub signature: SignatureConfig,
    pub storage: StorageConfig,
    /// Hex encoded key used by the cli to sign decryption requests
    pub private_key: Option<String>,
}

impl Default for FhevmConfig {
    fn default() -> Self {
        let mut mock_chains = BTreeMap::new();
        mock_chains.insert(HARDHAT_CHAIN_ID.to_string(), HARDHAT_RPC_URL.to_string());
        Self {
            rpc_url: None,
            chain_id: None,
            mock_chains,
            resolve_timeout_ms: DEFAULT_RESOLVE_TIMEOUT_MS,
            signature: SignatureConfig::default(),
            storage: StorageConfig::default(),
            private_key: None,
        }
    }
}

impl FhevmConfig {
    /// Mock chain table with parsed chain ids
    pub fn mock_chains(&self) -> Result<BTreeMap<u64, String>> {
        let mut chains = BTreeMap::new();
        for (chain_id, url) in &self.mock_chains {
            let id: u64 = chain_id
                .parse()
                .with_context(|| format!("Invalid chain id '{}' in mock_chains", chain_id))?;
            if id == 0 {
                bail!("Chain id 0 is not allowed in mock_chains");
            }
            chains.insert(id, url.clone());
        }
        Ok(chains)
    }

    pub fn rpc(&self) -> Result<Option<RpcUrl>> {
        self.rpc_url.as_deref().map(RpcUrl::parse).transpose()
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// Check every field that can be checked without touching the network
    pub fn validate(&self) -> Result<()> {
        self.rpc().context("Invalid rpc_url")?;
        if self.chain_id == Some(0) {
            bail!("chain_id must be greater than zero");
        }
        for (chain_id, url) in self.mock_chains()? {
            let rpc = RpcUrl::parse(&url)
                .with_context(|| format!("Invalid mock rpc url for chain {}", chain_id))?;
            if !rpc.is_local() {
                tracing::warn!(chain_id, url = %url, "mock chain points at a non-local node");
            }
        }
        if self.signature.duration_days == 0 {
            bail!("signature.duration_days must be greater than zero");
        }
        if self.signature.expiry_margin_secs
            >= self.signature.duration_days.saturating_mul(86_400)
        {
            bail!("signature.expiry_margin_secs must be shorter than the signature duration");
        }
        Ok(())
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{CancelToken, FhevmError, Result};
use anyhow::{anyhow, Context};
use fhevm_config::{DEFAULT_RESOLVE_TIMEOUT_MS, HARDHAT_CHAIN_ID, HARDHAT_RPC_URL};
use fhevm_relayer::{Connection, JsonRpc, ProviderRpc, RpcConnector};
use serde_json::{json, Value};
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tracing::{debug, instrument};

/// Chain id plus, for known local chains, the node to probe for mock support
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedNetwork {
    pub chain_id: u64,
    pub rpc_url: Option<String>,
}

pub fn default_mock_chains() -> BTreeMap<u64, String> {
    BTreeMap::from([(HARDHAT_CHAIN_ID, HARDHAT_RPC_URL.to_string())])
}

/// Accepts `0x` hex strings, decimal strings and JSON numbers
pub fn parse_chain_id(value: &Value) -> anyhow::Result<u64> {
    if let Some(id) = value.as_u64() {
        return Ok(id);
    }
    let text = value
        .as_str()
        .ok_or_else(|| anyhow!("Unexpected eth_chainId response: {}", value))?;
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    }
    .with_context(|| format!("Invalid chain id '{}'", text))
}

/// Works out which chain a connection points at
pub struct EnvironmentResolver {
    connector: Arc<dyn RpcConnector>,
    mock_chains: BTreeMap<u64, String>,
    timeout: Duration,
}

impl EnvironmentResolver {
    pub fn new(connector: Arc<dyn RpcConnector>) -> Self {
        Self {
            connector,
            mock_chains: default_mock_chains(),
            timeout: Duration::from_millis(DEFAULT_RESOLVE_TIMEOUT_MS),
        }
    }

    pub fn with_mock_chains(mut self, mock_chains: BTreeMap<u64, String>) -> Self {
        self.mock_chains = mock_chains;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn mock_chains(&self) -> &BTreeMap<u64, String> {
        &self.mock_chains
    }

    /// An explicit `chain_id` always wins. Otherwise the provider's advertised chain id is
    /// trusted and only then is `eth_chainId` queried.
    #[instrument(skip_all)]
    pub async fn resolve(
        &self,
        connection: &Connection,
        chain_id: Option<u64>,
        cancel: &CancelToken,
    ) -> Result<ResolvedNetwork> {
        let chain_id = match chain_id {
            Some(chain_id) => {
                debug!(chain_id, "using provided chain id");
                chain_id
            }
            None => self.query_chain_id(connection, cancel).await?,
        };

        if chain_id == 0 {
            return Err(FhevmError::InvalidChainId(chain_id));
        }

        let rpc_url = self.mock_chains.get(&chain_id).cloned();
        debug!(chain_id, rpc_url = ?rpc_url, "network resolved");
        Ok(ResolvedNetwork { chain_id, rpc_url })
    }

    async fn query_chain_id(&self, connection: &Connection, cancel: &CancelToken) -> Result<u64> {
        if let Connection::Provider(provider) = connection {
            if let Some(chain_id) = provider.chain_id() {
                debug!(chain_id, "got chain id from provider property");
                return Ok(chain_id);
            }
        }

        let query = async {
            let rpc: Arc<dyn JsonRpc> = match connection {
                Connection::RpcUrl(url) => self.connector.connect(url).await?,
                Connection::Provider(provider) => Arc::new(ProviderRpc(provider.clone())),
            };
            let value = rpc.request("eth_chainId", json!([])).await?;
            parse_chain_id(&value)
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(FhevmError::OperationCancelled),
            result = tokio::time::timeout(self.timeout, query) => match result {
                Ok(Ok(chain_id)) => Ok(chain_id),
                Ok(Err(e)) => Err(FhevmError::UnreachableEndpoint(format!("{:#}", e))),
                Err(_) => Err(FhevmError::UnreachableEndpoint(format!(
                    "no chain id within {}ms",
                    self.timeout.as_millis()
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chain_id() {
        assert_eq!(parse_chain_id(&json!("0x7a69")).unwrap(), 31337);
        assert_eq!(parse_chain_id(&json!("11155111")).unwrap(), 11155111);
        assert_eq!(parse_chain_id(&json!(1)).unwrap(), 1);
        assert!(parse_chain_id(&json!("0xzz")).is_err());
        assert!(parse_chain_id(&json!(null)).is_err());
    }
}

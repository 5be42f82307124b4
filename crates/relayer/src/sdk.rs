// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Connection, FhevmInstance, PublicKey, PublicParams};
use alloy::primitives::{address, Address};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Contract addresses and endpoints of one FHE deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub acl_contract_address: Address,
    pub kms_contract_address: Address,
    pub input_verifier_contract_address: Address,
    pub verifying_contract_address_decryption: Address,
    pub verifying_contract_address_input_verification: Address,
    pub chain_id: u64,
    pub gateway_chain_id: u64,
    pub relayer_url: String,
}

impl NetworkConfig {
    pub fn sepolia() -> Self {
        Self {
            acl_contract_address: address!("687820221192C5B662b25367F70076A37bc79b6c"),
            kms_contract_address: address!("1364cBBf2cDF5032C47d8226a6f6FBD2AFCDacAC"),
            input_verifier_contract_address: address!("bc91f3daD1A5F19F8390c400196e58073B6a0BC4"),
            verifying_contract_address_decryption: address!(
                "b6E160B1ff80D67Bfe90A85eE06Ce0A2613607D1"
            ),
            verifying_contract_address_input_verification: address!(
                "7048C39f048125eDa9d678AEbaDfB22F7900a29F"
            ),
            chain_id: 11155111,
            gateway_chain_id: 55815,
            relayer_url: "https://relayer.testnet.zama.cloud".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InitSdkOptions {
    /// Worker threads the SDK may spawn. `None` lets the SDK decide.
    pub thread: Option<usize>,
}

/// Network config merged with the connection and any persisted key material
#[derive(Clone, Debug)]
pub struct FhevmInstanceConfig {
    pub network_config: NetworkConfig,
    pub network: Connection,
    pub public_key: Option<PublicKey>,
    pub public_params: Option<PublicParams>,
}

/// The external relayer library
#[async_trait]
pub trait RelayerSdk: Send + Sync {
    /// Bring the library into the host. Safe to call again.
    async fn load(&self) -> Result<()>;

    /// Initialize the library. Returns false when it refused to initialize.
    async fn init_sdk(&self, options: InitSdkOptions) -> Result<bool>;

    async fn create_instance(&self, config: FhevmInstanceConfig)
        -> Result<Arc<dyn FhevmInstance>>;

    /// The deployment used when nothing else is configured
    fn network_config(&self) -> NetworkConfig;
}

/// Stand-in for builds that ship without a relayer library
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableRelayerSdk;

#[async_trait]
impl RelayerSdk for UnavailableRelayerSdk {
    async fn load(&self) -> Result<()> {
        bail!("No relayer SDK is linked into this build")
    }

    async fn init_sdk(&self, _options: InitSdkOptions) -> Result<bool> {
        Ok(false)
    }

    async fn create_instance(
        &self,
        _config: FhevmInstanceConfig,
    ) -> Result<Arc<dyn FhevmInstance>> {
        bail!("No relayer SDK is linked into this build")
    }

    fn network_config(&self) -> NetworkConfig {
        NetworkConfig::sepolia()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_sdk_fails_to_load() {
        let sdk = UnavailableRelayerSdk;
        assert!(sdk.load().await.is_err());
        assert_eq!(sdk.network_config().chain_id, 11155111);
    }
}

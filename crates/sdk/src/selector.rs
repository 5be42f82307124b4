// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    probe_hardhat, CancelToken, ClientStatus, FhevmError, ProbeOutcome, PublicKeyStore,
    ResolvedNetwork, Result, StatusNotifier,
};
use alloy::primitives::Address;
use fhevm_data::{DataStore, InMemoryStore};
use fhevm_relayer::{
    Connection, FhevmInstance, FhevmInstanceConfig, InitSdkOptions, MockInstanceFactory,
    MockInstanceParams, RelayerSdk, RpcConnector, PUBLIC_PARAMS_BITS,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// What the selector knows about the relayer library in this process
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SdkState {
    pub loaded: bool,
    pub initialized: bool,
}

/// Picks the mock backend when a local node supports it and the relayer SDK otherwise
pub struct BackendSelector<S: DataStore = InMemoryStore> {
    connector: Arc<dyn RpcConnector>,
    relayer: Arc<dyn RelayerSdk>,
    mock_factory: Option<Arc<dyn MockInstanceFactory>>,
    init_options: InitSdkOptions,
    sdk_state: Mutex<SdkState>,
    public_keys: PublicKeyStore<S>,
}

impl<S: DataStore> BackendSelector<S> {
    pub fn new(
        connector: Arc<dyn RpcConnector>,
        relayer: Arc<dyn RelayerSdk>,
        public_keys: PublicKeyStore<S>,
    ) -> Self {
        Self {
            connector,
            relayer,
            mock_factory: None,
            init_options: InitSdkOptions::default(),
            sdk_state: Mutex::new(SdkState::default()),
            public_keys,
        }
    }

    /// Without a factory local nodes are never probed
    pub fn with_mock_factory(mut self, factory: Arc<dyn MockInstanceFactory>) -> Self {
        self.mock_factory = Some(factory);
        self
    }

    pub fn with_init_options(mut self, options: InitSdkOptions) -> Self {
        self.init_options = options;
        self
    }

    pub async fn sdk_state(&self) -> SdkState {
        *self.sdk_state.lock().await
    }

    pub fn public_keys(&self) -> &PublicKeyStore<S> {
        &self.public_keys
    }

    #[instrument(skip_all, fields(chain_id = network.chain_id))]
    pub async fn select_backend(
        &self,
        network: &ResolvedNetwork,
        connection: &Connection,
        cancel: &CancelToken,
        notifier: &StatusNotifier,
    ) -> Result<Arc<dyn FhevmInstance>> {
        cancel.check()?;

        if let Some(rpc_url) = &network.rpc_url {
            if let Some(instance) = self
                .try_mock(network.chain_id, rpc_url, cancel, notifier)
                .await?
            {
                return Ok(instance);
            }
        }

        info!("using relayer SDK");
        self.ensure_sdk_ready(cancel, notifier).await?;

        let network_config = self.relayer.network_config();
        if network_config.chain_id != network.chain_id {
            warn!(
                sdk_chain_id = network_config.chain_id,
                "relayer network config targets a different chain"
            );
        }
        let acl_address = network_config.acl_contract_address;
        if acl_address == Address::ZERO {
            return Err(FhevmError::InvalidAddress(acl_address.to_string()));
        }

        let stored = cancel.guard(self.public_keys.get(&acl_address)).await??;

        notifier.emit(ClientStatus::Creating);
        let config = FhevmInstanceConfig {
            network_config,
            network: connection.clone(),
            public_key: stored.public_key,
            public_params: stored.public_params,
        };
        let instance = cancel
            .guard(self.relayer.create_instance(config))
            .await?
            .map_err(FhevmError::Backend)?;

        // Persisted even when cancelled so the next attempt can reuse the key
        self.public_keys
            .set(
                &acl_address,
                instance.get_public_key(),
                instance.get_public_params(PUBLIC_PARAMS_BITS),
            )
            .await?;

        cancel.check()?;
        Ok(instance)
    }

    async fn try_mock(
        &self,
        chain_id: u64,
        rpc_url: &str,
        cancel: &CancelToken,
        notifier: &StatusNotifier,
    ) -> Result<Option<Arc<dyn FhevmInstance>>> {
        let Some(factory) = &self.mock_factory else {
            debug!("no mock backend available, skipping probe");
            return Ok(None);
        };

        let probe = async {
            match self.connector.connect(rpc_url).await {
                Ok(rpc) => probe_hardhat(rpc.as_ref()).await,
                Err(e) => ProbeOutcome::Unreachable(format!("{:#}", e)),
            }
        };
        let outcome = cancel.guard(probe).await?;

        let metadata = match outcome {
            ProbeOutcome::MockCapable(metadata) => metadata,
            ProbeOutcome::NotMock(reason) => {
                info!(rpc_url, reason, "not an FHE mock node, falling back");
                return Ok(None);
            }
            ProbeOutcome::Unreachable(reason) => {
                warn!(rpc_url, reason, "mock node unreachable, falling back");
                return Ok(None);
            }
        };

        info!(rpc_url, acl = %metadata.acl_address, "FHE mock node detected");
        notifier.emit(ClientStatus::Creating);
        let instance = cancel
            .guard(factory.create_mock_instance(MockInstanceParams {
                rpc_url: rpc_url.to_string(),
                chain_id,
                metadata,
            }))
            .await?
            .map_err(FhevmError::Backend)?;
        cancel.check()?;
        Ok(Some(instance))
    }

    /// Load and initialize the relayer SDK once per selector. The lock keeps concurrent
    /// creations from doing it twice. Waiting for the lock is itself cancellable.
    async fn ensure_sdk_ready(&self, cancel: &CancelToken, notifier: &StatusNotifier) -> Result<()> {
        let mut state = cancel.guard(self.sdk_state.lock()).await?;

        if !state.loaded {
            notifier.emit(ClientStatus::SdkLoading);
            cancel
                .guard(self.relayer.load())
                .await?
                .map_err(|e| FhevmError::BackendUnavailable(format!("{:#}", e)))?;
            state.loaded = true;
            cancel.check()?;
            notifier.emit(ClientStatus::SdkLoaded);
        }

        if !state.initialized {
            notifier.emit(ClientStatus::SdkInitializing);
            let initialized = cancel
                .guard(self.relayer.init_sdk(self.init_options))
                .await?
                .map_err(|e| FhevmError::BackendUnavailable(format!("{:#}", e)))?;
            if !initialized {
                return Err(FhevmError::BackendUnavailable(
                    "relayer SDK refused to initialize".to_string(),
                ));
            }
            state.initialized = true;
            cancel.check()?;
            notifier.emit(ClientStatus::SdkInitialized);
        }

        Ok(())
    }
}

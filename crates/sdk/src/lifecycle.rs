// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    BackendSelector, CancelToken, ClientStatus, EnvironmentResolver, FhevmError, PublicKeyStore,
    Result, SignatureCache, StatusNotifier, StatusObserver,
};
use anyhow::Context;
use fhevm_config::FhevmConfig;
use fhevm_data::{DataStore, InMemoryStore, SharedStore};
use fhevm_relayer::{
    AlloyConnector, Connection, FhevmInstance, MockInstanceFactory, RelayerSdk, RpcConnector,
};
use std::{fmt, sync::Arc};
use tracing::{error, info, instrument};

/// Inputs of one client creation
#[derive(Clone)]
pub struct CreateOptions {
    pub connection: Connection,
    /// Skips chain id resolution when set
    pub chain_id: Option<u64>,
    pub cancel: CancelToken,
    pub on_status_change: Option<StatusObserver>,
}

impl CreateOptions {
    pub fn new(connection: impl Into<Connection>) -> Self {
        Self {
            connection: connection.into(),
            chain_id: None,
            cancel: CancelToken::new(),
            on_status_change: None,
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn on_status_change(mut self, observer: StatusObserver) -> Self {
        self.on_status_change = Some(observer);
        self
    }
}

impl fmt::Debug for CreateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateOptions")
            .field("connection", &self.connection)
            .field("chain_id", &self.chain_id)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Long lived collaborators shared by every client created from it: the resolver, the
/// backend selector with its SDK state and the signature and public key stores.
pub struct FhevmEnvironment<S: DataStore = InMemoryStore> {
    resolver: EnvironmentResolver,
    selector: BackendSelector<S>,
    signatures: SignatureCache<S>,
}

impl<S: DataStore> FhevmEnvironment<S> {
    pub fn new(
        connector: Arc<dyn RpcConnector>,
        relayer: Arc<dyn RelayerSdk>,
        store: SharedStore<S>,
    ) -> Self {
        Self {
            resolver: EnvironmentResolver::new(connector.clone()),
            selector: BackendSelector::new(connector, relayer, PublicKeyStore::new(store.clone())),
            signatures: SignatureCache::new(store),
        }
    }

    /// Build from loaded configuration, talking to nodes through alloy. The mock backend is
    /// wired in when the `mock` feature is enabled.
    pub fn from_config(
        config: &FhevmConfig,
        relayer: Arc<dyn RelayerSdk>,
        store: SharedStore<S>,
    ) -> anyhow::Result<Self> {
        let mock_chains = config.mock_chains().context("Invalid mock_chains")?;
        #[allow(unused_mut)]
        let mut env = Self::new(Arc::new(AlloyConnector), relayer, store)
            .map_resolver(|r| {
                r.with_mock_chains(mock_chains)
                    .with_timeout(config.resolve_timeout())
            })
            .map_signatures(|s| s.with_config(&config.signature));
        #[cfg(feature = "mock")]
        {
            env = env.with_mock_factory(Arc::new(fhevm_mock::HardhatMockFactory));
        }
        Ok(env)
    }

    pub fn with_mock_factory(self, factory: Arc<dyn MockInstanceFactory>) -> Self {
        self.map_selector(|s| s.with_mock_factory(factory))
    }

    pub fn map_resolver(
        mut self,
        f: impl FnOnce(EnvironmentResolver) -> EnvironmentResolver,
    ) -> Self {
        self.resolver = f(self.resolver);
        self
    }

    pub fn map_selector(
        mut self,
        f: impl FnOnce(BackendSelector<S>) -> BackendSelector<S>,
    ) -> Self {
        self.selector = f(self.selector);
        self
    }

    pub fn map_signatures(
        mut self,
        f: impl FnOnce(SignatureCache<S>) -> SignatureCache<S>,
    ) -> Self {
        self.signatures = f(self.signatures);
        self
    }

    pub fn resolver(&self) -> &EnvironmentResolver {
        &self.resolver
    }

    pub fn selector(&self) -> &BackendSelector<S> {
        &self.selector
    }

    pub fn signatures(&self) -> &SignatureCache<S> {
        &self.signatures
    }

    /// Resolve the network and select a backend, reporting every step to the observer.
    ///
    /// Ends in `ready` or `error`. A cancelled creation reports neither and returns
    /// [`FhevmError::OperationCancelled`].
    #[instrument(skip_all, fields(connection = ?options.connection))]
    pub async fn create_instance(&self, options: &CreateOptions) -> Result<Arc<dyn FhevmInstance>> {
        let cancel = &options.cancel;
        let notifier = StatusNotifier::new(options.on_status_change.clone(), cancel.clone());

        let result = async {
            let network = self
                .resolver
                .resolve(&options.connection, options.chain_id, cancel)
                .await?;
            cancel.check()?;
            self.selector
                .select_backend(&network, &options.connection, cancel, &notifier)
                .await
        }
        .await
        .and_then(|instance| {
            cancel.check()?;
            Ok(instance)
        });

        match result {
            Ok(instance) => {
                info!(backend = %instance.kind(), "fhevm instance ready");
                notifier.emit(ClientStatus::Ready);
                Ok(instance)
            }
            Err(FhevmError::OperationCancelled) => {
                info!("fhevm instance creation cancelled");
                Err(FhevmError::OperationCancelled)
            }
            Err(e) => {
                error!(error = %e, "fhevm instance creation failed");
                notifier.emit(ClientStatus::Error);
                Err(e)
            }
        }
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{lock, FakeInstance};
use anyhow::{bail, Result};
use async_trait::async_trait;
use fhevm_relayer::{
    BackendKind, FhevmInstance, FhevmInstanceConfig, InitSdkOptions, MockInstanceFactory,
    MockInstanceParams, NetworkConfig, RelayerSdk,
};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

type Hook = Box<dyn Fn() + Send + Sync>;

/// Relayer library double. Counts calls, can be told to fail and runs hooks so tests can
/// interleave cancellation with a specific step.
pub struct FakeRelayerSdk {
    network_config: NetworkConfig,
    loads: AtomicUsize,
    inits: AtomicUsize,
    creates: AtomicUsize,
    fail_load: AtomicBool,
    fail_init: AtomicBool,
    refuse_init: AtomicBool,
    load_delay: Option<Duration>,
    on_load: Option<Hook>,
    on_create: Option<Hook>,
    instance_configs: Mutex<Vec<FhevmInstanceConfig>>,
    last_instance: Mutex<Option<Arc<FakeInstance>>>,
}

impl Default for FakeRelayerSdk {
    fn default() -> Self {
        Self {
            network_config: NetworkConfig::sepolia(),
            loads: AtomicUsize::new(0),
            inits: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            fail_load: AtomicBool::new(false),
            fail_init: AtomicBool::new(false),
            refuse_init: AtomicBool::new(false),
            load_delay: None,
            on_load: None,
            on_create: None,
            instance_configs: Mutex::new(vec![]),
            last_instance: Mutex::new(None),
        }
    }
}

impl FakeRelayerSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network_config(mut self, network_config: NetworkConfig) -> Self {
        self.network_config = network_config;
        self
    }

    /// `load` takes this long before answering
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    pub fn with_load_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_load = Some(Box::new(hook));
        self
    }

    pub fn with_create_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_create = Some(Box::new(hook));
        self
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }

    /// `init_sdk` answers `false` instead of erroring
    pub fn refuse_init(&self, refuse: bool) {
        self.refuse_init.store(refuse, Ordering::SeqCst);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Total number of calls into the library
    pub fn sdk_calls(&self) -> usize {
        self.loads() + self.inits() + self.creates()
    }

    pub fn instance_configs(&self) -> Vec<FhevmInstanceConfig> {
        lock(&self.instance_configs).clone()
    }

    pub fn last_instance(&self) -> Option<Arc<FakeInstance>> {
        lock(&self.last_instance).clone()
    }
}

#[async_trait]
impl RelayerSdk for FakeRelayerSdk {
    async fn load(&self) -> Result<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match self.load_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        if let Some(hook) = &self.on_load {
            hook();
        }
        if self.fail_load.load(Ordering::SeqCst) {
            bail!("relayer sdk failed to load");
        }
        Ok(())
    }

    async fn init_sdk(&self, _options: InitSdkOptions) -> Result<bool> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_init.load(Ordering::SeqCst) {
            bail!("relayer sdk failed to initialize");
        }
        Ok(!self.refuse_init.load(Ordering::SeqCst))
    }

    async fn create_instance(
        &self,
        config: FhevmInstanceConfig,
    ) -> Result<Arc<dyn FhevmInstance>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let chain_id = config.network_config.chain_id;
        let reused_key = config.public_key.clone();
        lock(&self.instance_configs).push(config);
        tokio::task::yield_now().await;

        let mut instance = FakeInstance::new(BackendKind::Relayer, chain_id);
        if reused_key.is_some() {
            instance = instance.with_public_key(reused_key);
        }
        let instance = Arc::new(instance);
        *lock(&self.last_instance) = Some(instance.clone());

        if let Some(hook) = &self.on_create {
            hook();
        }
        Ok(instance)
    }

    fn network_config(&self) -> NetworkConfig {
        self.network_config.clone()
    }
}

/// Mock factory double producing [`FakeInstance`]s of kind `Mock`
#[derive(Default)]
pub struct FakeMockFactory {
    creates: AtomicUsize,
    params: Mutex<Vec<MockInstanceParams>>,
}

impl FakeMockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn params(&self) -> Vec<MockInstanceParams> {
        lock(&self.params).clone()
    }
}

#[async_trait]
impl MockInstanceFactory for FakeMockFactory {
    async fn create_mock_instance(
        &self,
        params: MockInstanceParams,
    ) -> Result<Arc<dyn FhevmInstance>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let chain_id = params.chain_id;
        lock(&self.params).push(params);
        Ok(Arc::new(FakeInstance::new(BackendKind::Mock, chain_id)))
    }
}

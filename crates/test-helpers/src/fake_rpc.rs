// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{lock, HARDHAT_CLIENT_VERSION};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use fhevm_relayer::{
    Eip1193Provider, JsonRpc, RelayerMetadata, RpcConnector, RELAYER_METADATA_METHOD,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

/// Scripted JSON-RPC endpoint that records every call
#[derive(Default)]
pub struct FakeRpc {
    responses: Mutex<HashMap<String, Result<Value, String>>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FakeRpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hardhat node serving FHE mock metadata
    pub fn hardhat(chain_id: u64, metadata: &RelayerMetadata) -> Self {
        Self::new()
            .with_chain_id(chain_id)
            .with_response("web3_clientVersion", json!(HARDHAT_CLIENT_VERSION))
            .with_response(RELAYER_METADATA_METHOD, json!(metadata))
    }

    pub fn with_chain_id(self, chain_id: u64) -> Self {
        self.with_response("eth_chainId", json!(format!("0x{:x}", chain_id)))
    }

    pub fn with_response(self, method: &str, value: Value) -> Self {
        lock(&self.responses).insert(method.to_string(), Ok(value));
        self
    }

    pub fn with_error(self, method: &str, message: &str) -> Self {
        lock(&self.responses).insert(method.to_string(), Err(message.to_string()));
        self
    }

    /// Every request sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        lock(&self.calls).iter().filter(|m| *m == method).count()
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl JsonRpc for FakeRpc {
    async fn request(&self, method: &str, _params: Value) -> Result<Value> {
        lock(&self.calls).push(method.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match lock(&self.responses).get(method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(anyhow!("{}", message)),
            None => Err(anyhow!("the method {} does not exist/is not available", method)),
        }
    }
}

/// Hands out [`FakeRpc`]s by url. Unknown urls refuse the connection.
#[derive(Default)]
pub struct FakeConnector {
    endpoints: HashMap<String, Arc<FakeRpc>>,
    connects: AtomicUsize,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, url: &str, rpc: Arc<FakeRpc>) -> Self {
        self.endpoints.insert(url.to_string(), rpc);
        self
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RpcConnector for FakeConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn JsonRpc>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let rpc = self
            .endpoints
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", url))?;
        Ok(rpc)
    }
}

/// Injected wallet provider backed by a [`FakeRpc`]
pub struct FakeProvider {
    chain_id: Option<u64>,
    rpc: Arc<FakeRpc>,
}

impl FakeProvider {
    pub fn new(chain_id: Option<u64>, rpc: Arc<FakeRpc>) -> Self {
        Self { chain_id, rpc }
    }
}

#[async_trait]
impl Eip1193Provider for FakeProvider {
    fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.rpc.request(method, params).await
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::{borrow::Cow, fmt, sync::Arc};
use tracing::trace;
use url::Url;

/// Minimal JSON-RPC transport
#[async_trait]
pub trait JsonRpc: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// Opens JSON-RPC transports to endpoint urls
#[async_trait]
pub trait RpcConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Arc<dyn JsonRpc>>;
}

/// An already-connected wallet provider that the caller injects instead of a url
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    /// Chain id the provider advertises without a round trip, if any
    fn chain_id(&self) -> Option<u64> {
        None
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// Routes JSON-RPC calls through an injected provider
pub struct ProviderRpc(pub Arc<dyn Eip1193Provider>);

#[async_trait]
impl JsonRpc for ProviderRpc {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.0.request(method, params).await
    }
}

/// Where the client talks to the chain
#[derive(Clone)]
pub enum Connection {
    RpcUrl(String),
    Provider(Arc<dyn Eip1193Provider>),
}

impl Connection {
    pub fn rpc_url(&self) -> Option<&str> {
        match self {
            Connection::RpcUrl(url) => Some(url),
            Connection::Provider(_) => None,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::RpcUrl(url) => f.debug_tuple("RpcUrl").field(url).finish(),
            Connection::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

impl From<&str> for Connection {
    fn from(value: &str) -> Self {
        Connection::RpcUrl(value.to_owned())
    }
}

impl From<String> for Connection {
    fn from(value: String) -> Self {
        Connection::RpcUrl(value)
    }
}

/// JSON-RPC over an alloy provider
pub struct AlloyJsonRpc {
    provider: DynProvider,
}

impl AlloyJsonRpc {
    pub async fn connect(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid RPC url '{}'", url))?;
        let provider = ProviderBuilder::new()
            .connect(url.as_str())
            .await
            .with_context(|| format!("Could not connect to {}", url))?
            .erased();
        Ok(Self { provider })
    }
}

#[async_trait]
impl JsonRpc for AlloyJsonRpc {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        trace!(method, "json-rpc request");
        let result: Value = self
            .provider
            .raw_request(Cow::Owned(method.to_owned()), params)
            .await?;
        Ok(result)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AlloyConnector;

#[async_trait]
impl RpcConnector for AlloyConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn JsonRpc>> {
        Ok(Arc::new(AlloyJsonRpc::connect(url).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_from_url() {
        let connection = Connection::from("http://localhost:8545");
        assert_eq!(connection.rpc_url(), Some("http://localhost:8545"));
        assert_eq!(
            format!("{:?}", connection),
            "RpcUrl(\"http://localhost:8545\")"
        );
    }
}

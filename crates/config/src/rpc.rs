// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, bail, Context, Result};
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcProtocol {
    Http,
    Https,
    Ws,
    Wss,
}

impl RpcProtocol {
    pub fn is_websocket(&self) -> bool {
        matches!(self, RpcProtocol::Ws | RpcProtocol::Wss)
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, RpcProtocol::Https | RpcProtocol::Wss)
    }
}

/// A validated JSON-RPC endpoint
#[derive(Clone, Debug)]
pub struct RpcUrl {
    protocol: RpcProtocol,
    url: Url,
}

impl RpcUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).context("Invalid URL format")?;
        let protocol = match parsed.scheme() {
            "http" => RpcProtocol::Http,
            "https" => RpcProtocol::Https,
            "ws" => RpcProtocol::Ws,
            "wss" => RpcProtocol::Wss,
            _ => bail!("Invalid protocol. Expected: http://, https://, ws://, wss://"),
        };

        if parsed.host_str().is_none() {
            bail!("URL must contain a host");
        }

        Ok(RpcUrl {
            protocol,
            url: parsed,
        })
    }

    pub fn protocol(&self) -> RpcProtocol {
        self.protocol
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// JSON-RPC probes are always sent over http(s) even when the endpoint was configured as a
    /// websocket.
    pub fn as_http_url(&self) -> Result<String> {
        if !self.protocol.is_websocket() {
            return Ok(self.url.to_string());
        }
        let mut parsed = self.url.clone();
        let scheme = if self.protocol.is_secure() {
            "https"
        } else {
            "http"
        };
        parsed
            .set_scheme(scheme)
            .map_err(|_| anyhow!("http(s) are valid schemes"))?;
        Ok(parsed.to_string())
    }

    pub fn is_local(&self) -> bool {
        match self.hostname() {
            "localhost" | "127.0.0.1" | "::1" | "[::1]" => true,
            host => host.starts_with("127."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_locality() -> Result<()> {
        let rpc = RpcUrl::parse("http://localhost:8545")?;
        assert_eq!(rpc.protocol(), RpcProtocol::Http);
        assert!(rpc.is_local());

        let rpc = RpcUrl::parse("https://sepolia.infura.io/v3/key")?;
        assert!(!rpc.is_local());
        assert!(rpc.protocol().is_secure());

        assert!(RpcUrl::parse("ftp://localhost").is_err());
        assert!(RpcUrl::parse("not a url").is_err());
        Ok(())
    }

    #[test]
    fn test_websocket_as_http() -> Result<()> {
        let rpc = RpcUrl::parse("ws://127.0.0.1:8545")?;
        assert_eq!(rpc.as_http_url()?, "http://127.0.0.1:8545/");

        let rpc = RpcUrl::parse("wss://node.example.com")?;
        assert_eq!(rpc.as_http_url()?, "https://node.example.com/");
        Ok(())
    }
}

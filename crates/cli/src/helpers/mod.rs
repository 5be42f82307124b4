// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use fhevm_config::FhevmConfig;
use fhevm_data::DataStore;
use fhevm_relayer::{ClearValue, FhevmType};
use fhevm_sdk::{CancelToken, CreateOptions, FhevmClient, FhevmEnvironment, StatusObserver};
use std::str::FromStr;
use zeroize::Zeroizing;

pub mod telemetry;

/// Parse to a Zeroizing String
pub fn parse_zeroizing(s: &str) -> Result<Zeroizing<String>> {
    Ok(Zeroizing::new(s.to_string()))
}

/// Ensure hex is of the form 0x12435687abcdef...
pub fn ensure_hex_zeroizing(s: &str) -> Result<Zeroizing<String>> {
    parse_zeroizing(ensure_hex(s)?)
}

fn ensure_hex(s: &str) -> Result<&str> {
    let Some(digits) = s.strip_prefix("0x") else {
        bail!("hex value must start with '0x'")
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("private key must only contain hex characters [0-9a-fA-F]");
    }
    Ok(s)
}

/// Wallet used to sign decryption requests. Falls back to a throwaway key.
pub fn load_signer(private_key: Option<Zeroizing<String>>) -> Result<PrivateKeySigner> {
    match private_key {
        Some(key) => {
            let key = ensure_hex_zeroizing(&key)?;
            PrivateKeySigner::from_str(&key).context("Invalid private key")
        }
        None => {
            let signer = PrivateKeySigner::random();
            tracing::warn!(address = %signer.address(), "no private key configured, using a random wallet");
            Ok(signer)
        }
    }
}

/// Creation options for the configured endpoint
pub fn create_options(config: &FhevmConfig) -> Result<CreateOptions> {
    let rpc_url = config
        .rpc_url
        .clone()
        .context("No rpc_url configured. Pass --rpc-url or set rpc_url in fhevm.config.yaml")?;
    let mut options = CreateOptions::new(rpc_url);
    options.chain_id = config.chain_id;
    Ok(options)
}

/// Create a client, cancelling the creation on ctrl-c
pub async fn create_client<S: DataStore>(
    env: &FhevmEnvironment<S>,
    config: &FhevmConfig,
    observer: Option<StatusObserver>,
) -> Result<FhevmClient<S>> {
    let cancel = CancelToken::new();
    let mut options = create_options(config)?.with_cancel(cancel.clone());
    options.on_status_change = observer;

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    let client = FhevmClient::create(env, options).await;
    interrupt.abort();
    Ok(client?)
}

/// Read a value from the command line as the plaintext for `ty`
pub fn parse_clear_value(value: &str, ty: FhevmType) -> Result<ClearValue> {
    let parsed = match ty {
        FhevmType::Bool => ClearValue::Bool(
            bool::from_str(value).with_context(|| format!("'{}' is not a bool", value))?,
        ),
        FhevmType::Address => ClearValue::Address(
            Address::from_str(value).with_context(|| format!("'{}' is not an address", value))?,
        ),
        _ => ClearValue::Uint(
            U256::from_str(value).with_context(|| format!("'{}' is not an integer", value))?,
        ),
    };
    Ok(parsed)
}

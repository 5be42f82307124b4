// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{create_client, load_signer};
use alloy::hex;
use anyhow::{Context, Result};
use fhevm_config::FhevmConfig;
use fhevm_data::DataStore;
use fhevm_relayer::DecryptRequest;
use fhevm_sdk::{parse_address, ClientStatus, FhevmEnvironment, StatusObserver};
use std::sync::Arc;
use tracing::info;
use zeroize::Zeroizing;

pub async fn execute<S: DataStore>(
    env: &FhevmEnvironment<S>,
    config: &FhevmConfig,
    contract: String,
    value: u64,
    private_key: Option<Zeroizing<String>>,
) -> Result<()> {
    let contract_address = parse_address(&contract)?;
    let signer = load_signer(private_key)?;
    let user = signer.address().to_string();
    println!("wallet: {}", user);

    let observer: StatusObserver =
        Arc::new(|status: ClientStatus| info!(%status, "client status changed"));
    let client = create_client(env, config, Some(observer)).await?;
    println!("backend: {}", client.backend_kind()?);

    let encrypted = client.encrypt_u64(value, &contract, &user).await?;
    let handle = encrypted
        .handles
        .first()
        .map(hex::encode_prefixed)
        .context("Backend returned no handle")?;
    println!("handle: {}", handle);
    println!("input proof: {} bytes", encrypted.input_proof.len());

    let requests = [DecryptRequest::new(handle.clone(), contract_address)];
    // The second round reuses the stored authorization
    for round in 1..=2 {
        let values = client.user_decrypt(&requests, &signer).await?;
        let clear = values
            .get(&handle)
            .context("Handle missing from decryption result")?;
        println!("decrypted (round {}): {}", round, clear);
    }

    Ok(())
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::create_client;
use anyhow::Result;
use fhevm_config::FhevmConfig;
use fhevm_data::DataStore;
use fhevm_sdk::{ClientStatus, FhevmEnvironment, StatusObserver};
use std::sync::Arc;

pub async fn execute<S: DataStore>(env: &FhevmEnvironment<S>, config: &FhevmConfig) -> Result<()> {
    let observer: StatusObserver = Arc::new(|status: ClientStatus| println!("{}", status));
    let client = create_client(env, config, Some(observer)).await?;

    println!("backend: {}", client.backend_kind()?);
    match client.public_key()? {
        Some(public_key) => println!("public key: {}", public_key.id),
        None => println!("public key: none"),
    }

    Ok(())
}

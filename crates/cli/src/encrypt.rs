// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{create_client, load_signer, parse_clear_value};
use anyhow::{bail, Result};
use fhevm_config::FhevmConfig;
use fhevm_data::DataStore;
use fhevm_relayer::FhevmType;
use fhevm_sdk::{FhevmEnvironment, FhevmError};
use std::str::FromStr;
use zeroize::Zeroizing;

pub async fn execute<S: DataStore>(
    env: &FhevmEnvironment<S>,
    config: &FhevmConfig,
    contract: String,
    user: Option<String>,
    ty: String,
    value: String,
) -> Result<()> {
    let ty = FhevmType::from_str(&ty).map_err(|_| FhevmError::UnsupportedType(ty.clone()))?;
    let value = parse_clear_value(&value, ty)?;

    let user = match (user, &config.private_key) {
        (Some(user), _) => user,
        (None, Some(key)) => load_signer(Some(Zeroizing::new(key.clone())))?
            .address()
            .to_string(),
        (None, None) => bail!("--user is required when no private_key is configured"),
    };

    let client = create_client(env, config, None).await?;
    let encrypted = client.encrypt(value, ty, &contract, &user).await?;
    println!("{}", serde_json::to_string_pretty(&encrypted)?);

    Ok(())
}

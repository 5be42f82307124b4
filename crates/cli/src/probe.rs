// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::create_options;
use anyhow::Result;
use fhevm_config::{FhevmConfig, RpcUrl};
use fhevm_data::DataStore;
use fhevm_relayer::{AlloyConnector, RpcConnector};
use fhevm_sdk::{probe_hardhat, FhevmEnvironment, ProbeOutcome};

pub async fn execute<S: DataStore>(env: &FhevmEnvironment<S>, config: &FhevmConfig) -> Result<()> {
    let options = create_options(config)?;
    let network = env
        .resolver()
        .resolve(&options.connection, options.chain_id, &options.cancel)
        .await?;
    println!("chain id: {}", network.chain_id);

    let Some(rpc_url) = network.rpc_url else {
        println!("backend: relayer (no mock node configured for this chain)");
        return Ok(());
    };

    let http_url = RpcUrl::parse(&rpc_url)?.as_http_url()?;
    let outcome = match AlloyConnector.connect(&http_url).await {
        Ok(rpc) => probe_hardhat(rpc.as_ref()).await,
        Err(e) => ProbeOutcome::Unreachable(format!("{:#}", e)),
    };

    match outcome {
        ProbeOutcome::MockCapable(metadata) => {
            println!("backend: mock ({})", rpc_url);
            println!("acl: {}", metadata.acl_address);
            println!("input verifier: {}", metadata.input_verifier_address);
            println!("kms verifier: {}", metadata.kms_verifier_address);
        }
        ProbeOutcome::NotMock(reason) => {
            println!("backend: relayer ({} is not an FHE mock node: {})", rpc_url, reason)
        }
        ProbeOutcome::Unreachable(reason) => {
            println!("backend: relayer ({} is unreachable: {})", rpc_url, reason)
        }
    }

    Ok(())
}

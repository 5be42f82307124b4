// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fhevm_relayer::{JsonRpc, RelayerMetadata, RELAYER_METADATA_METHOD};
use serde_json::json;
use tracing::trace;

pub const CLIENT_VERSION_METHOD: &str = "web3_clientVersion";
/// Lowercase marker a hardhat node puts in its client version
pub const HARDHAT_MARKER: &str = "hardhat";

/// Result of asking a local node whether it embeds the FHE mock
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    MockCapable(RelayerMetadata),
    /// The node answered but cannot serve as a mock backend
    NotMock(String),
    /// The node did not answer at all
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn metadata(&self) -> Option<&RelayerMetadata> {
        match self {
            ProbeOutcome::MockCapable(metadata) => Some(metadata),
            _ => None,
        }
    }
}

/// Never fails. Every problem turns into a non-capable outcome.
pub async fn probe_hardhat(rpc: &dyn JsonRpc) -> ProbeOutcome {
    let version = match rpc.request(CLIENT_VERSION_METHOD, json!([])).await {
        Ok(version) => version,
        Err(e) => return ProbeOutcome::Unreachable(format!("{:#}", e)),
    };
    trace!(%version, "client version");

    let Some(version) = version.as_str() else {
        return ProbeOutcome::NotMock(format!("unexpected client version {}", version));
    };
    if !version.to_lowercase().contains(HARDHAT_MARKER) {
        return ProbeOutcome::NotMock(format!("{} is not a hardhat node", version));
    }

    match rpc.request(RELAYER_METADATA_METHOD, json!([])).await {
        Ok(value) => match RelayerMetadata::from_json(&value) {
            Some(metadata) => ProbeOutcome::MockCapable(metadata),
            None => ProbeOutcome::NotMock(format!("malformed relayer metadata {}", value)),
        },
        Err(e) => ProbeOutcome::NotMock(format!("no relayer metadata: {:#}", e)),
    }
}

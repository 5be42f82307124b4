// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC method served by FHE-mock-capable hardhat nodes
pub const RELAYER_METADATA_METHOD: &str = "fhevm_relayer_metadata";

/// Contract addresses of the FHE deployment a local dev node embeds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerMetadata {
    #[serde(rename = "ACLAddress")]
    pub acl_address: Address,
    #[serde(rename = "InputVerifierAddress")]
    pub input_verifier_address: Address,
    #[serde(rename = "KMSVerifierAddress")]
    pub kms_verifier_address: Address,
}

impl RelayerMetadata {
    /// Returns `None` unless all three addresses are present and well formed
    pub fn from_json(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

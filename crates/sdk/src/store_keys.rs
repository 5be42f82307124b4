// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    hex,
    primitives::{Address, B256},
};

pub struct StoreKeys;

impl StoreKeys {
    pub fn decryption_signature(
        user_address: &Address,
        contracts_hash: &B256,
        public_key_fingerprint: &B256,
    ) -> String {
        format!(
            "//decryption_signature/{}/{}/{}",
            hex::encode_prefixed(user_address),
            hex::encode_prefixed(contracts_hash),
            hex::encode_prefixed(public_key_fingerprint)
        )
    }

    pub fn public_key(acl_address: &Address) -> String {
        format!("//public_key/{}", hex::encode_prefixed(acl_address))
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Handle layout:
//!
//! ```text
//! [0..21)  keccak256(blob_hash ++ index) prefix
//! [21]     index of the value within its input
//! [22..30) chain id, big endian
//! [30]     type byte
//! [31]     handle version
//! ```

use alloy::primitives::{keccak256, B256};
use fhevm_relayer::FhevmType;

pub const HANDLE_VERSION: u8 = 0;

pub fn compute_handle(blob_hash: B256, index: u8, ty: FhevmType, chain_id: u64) -> B256 {
    let mut preimage = Vec::with_capacity(33);
    preimage.extend_from_slice(blob_hash.as_slice());
    preimage.push(index);
    let digest = keccak256(&preimage);

    let mut handle = [0u8; 32];
    handle[..21].copy_from_slice(&digest[..21]);
    handle[21] = index;
    handle[22..30].copy_from_slice(&chain_id.to_be_bytes());
    handle[30] = ty.type_id();
    handle[31] = HANDLE_VERSION;
    B256::from(handle)
}

/// Type encoded in a handle
pub fn handle_type(handle: &B256) -> Option<FhevmType> {
    FhevmType::from_type_id(handle[30])
}

pub fn handle_chain_id(handle: &B256) -> u64 {
    let mut chain = [0u8; 8];
    chain.copy_from_slice(&handle[22..30]);
    u64::from_be_bytes(chain)
}

/// Canonical key for a handle string: lowercase, 0x prefixed
pub fn normalize_handle(handle: &str) -> String {
    let trimmed = handle.trim_start_matches("0x").trim_start_matches("0X");
    format!("0x{}", trimmed.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let handle = compute_handle(B256::repeat_byte(7), 3, FhevmType::Uint32, 31337);
        assert_eq!(handle[21], 3);
        assert_eq!(handle_chain_id(&handle), 31337);
        assert_eq!(handle_type(&handle), Some(FhevmType::Uint32));
        assert_eq!(handle[31], HANDLE_VERSION);

        let other = compute_handle(B256::repeat_byte(7), 4, FhevmType::Uint32, 31337);
        assert_ne!(handle[..21], other[..21]);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_handle("0xABcd"), "0xabcd");
        assert_eq!(normalize_handle("abcd"), "0xabcd");
    }
}

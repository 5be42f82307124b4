// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// Encrypted types a contract can accept
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum FhevmType {
    #[strum(serialize = "bool")]
    #[serde(rename = "bool")]
    Bool,
    #[strum(serialize = "uint8")]
    #[serde(rename = "uint8")]
    Uint8,
    #[strum(serialize = "uint16")]
    #[serde(rename = "uint16")]
    Uint16,
    #[strum(serialize = "uint32")]
    #[serde(rename = "uint32")]
    Uint32,
    #[strum(serialize = "uint64")]
    #[serde(rename = "uint64")]
    Uint64,
    #[strum(serialize = "uint128")]
    #[serde(rename = "uint128")]
    Uint128,
    #[strum(serialize = "uint256")]
    #[serde(rename = "uint256")]
    Uint256,
    #[strum(serialize = "address")]
    #[serde(rename = "address")]
    Address,
}

impl FhevmType {
    /// Width of the plaintext in bits
    pub fn bits(&self) -> usize {
        match self {
            FhevmType::Bool => 2,
            FhevmType::Uint8 => 8,
            FhevmType::Uint16 => 16,
            FhevmType::Uint32 => 32,
            FhevmType::Uint64 => 64,
            FhevmType::Uint128 => 128,
            FhevmType::Uint256 => 256,
            FhevmType::Address => 160,
        }
    }

    /// Type byte embedded in handles
    pub fn type_id(&self) -> u8 {
        match self {
            FhevmType::Bool => 0,
            FhevmType::Uint8 => 2,
            FhevmType::Uint16 => 3,
            FhevmType::Uint32 => 4,
            FhevmType::Uint64 => 5,
            FhevmType::Uint128 => 6,
            FhevmType::Address => 7,
            FhevmType::Uint256 => 8,
        }
    }

    pub fn from_type_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => FhevmType::Bool,
            2 => FhevmType::Uint8,
            3 => FhevmType::Uint16,
            4 => FhevmType::Uint32,
            5 => FhevmType::Uint64,
            6 => FhevmType::Uint128,
            7 => FhevmType::Address,
            8 => FhevmType::Uint256,
            _ => return None,
        })
    }

    /// Largest representable value for unsigned integer types
    pub fn max_value(&self) -> Option<U256> {
        match self {
            FhevmType::Bool | FhevmType::Address => None,
            ty => Some(U256::MAX >> (256 - ty.bits())),
        }
    }

    pub fn is_uint(&self) -> bool {
        self.max_value().is_some()
    }
}

/// A plaintext value going into an encryption or coming out of a decryption
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearValue {
    Bool(bool),
    Uint(U256),
    Address(Address),
}

impl ClearValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ClearValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            ClearValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            ClearValue::Address(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ClearValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearValue::Bool(v) => write!(f, "{v}"),
            ClearValue::Uint(v) => write!(f, "{v}"),
            ClearValue::Address(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ClearValue {
    fn from(value: bool) -> Self {
        ClearValue::Bool(value)
    }
}

impl From<u64> for ClearValue {
    fn from(value: u64) -> Self {
        ClearValue::Uint(U256::from(value))
    }
}

impl From<u128> for ClearValue {
    fn from(value: u128) -> Self {
        ClearValue::Uint(U256::from(value))
    }
}

impl From<U256> for ClearValue {
    fn from(value: U256) -> Self {
        ClearValue::Uint(value)
    }
}

impl From<Address> for ClearValue {
    fn from(value: Address) -> Self {
        ClearValue::Address(value)
    }
}

/// Ciphertext handles plus the proof a contract needs to accept them
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    pub handles: Vec<Bytes>,
    pub input_proof: Bytes,
}

/// A handle to decrypt and the contract that holds it
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecryptRequest {
    pub handle: String,
    pub contract_address: Address,
}

impl DecryptRequest {
    pub fn new(handle: impl Into<String>, contract_address: Address) -> Self {
        Self {
            handle: handle.into(),
            contract_address,
        }
    }
}

/// Decrypted values keyed by the literal handle string
pub type DecryptResult = HashMap<String, ClearValue>;

/// Ephemeral keypair the decryption result is re-encrypted under
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub id: String,
    pub data: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicParams {
    pub id: String,
    pub data: Bytes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum BackendKind {
    #[strum(serialize = "mock")]
    Mock,
    #[strum(serialize = "relayer")]
    Relayer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_type_tags() {
        for ty in FhevmType::iter() {
            assert_eq!(FhevmType::from_str(&ty.to_string()).unwrap(), ty);
            assert_eq!(FhevmType::from_type_id(ty.type_id()), Some(ty));
        }
        assert!(FhevmType::from_str("uint512").is_err());
        assert!(FhevmType::from_str("euint32").is_err());
    }

    #[test]
    fn test_max_values() {
        assert_eq!(FhevmType::Uint8.max_value(), Some(U256::from(255u64)));
        assert_eq!(FhevmType::Uint32.max_value(), Some(U256::from(u32::MAX)));
        assert_eq!(FhevmType::Uint256.max_value(), Some(U256::MAX));
        assert_eq!(FhevmType::Bool.max_value(), None);
        assert!(!FhevmType::Address.is_uint());
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    BackendKind, DecryptResult, Eip712Payload, EncryptedInput, Keypair, PublicKey, PublicParams,
};
use alloy::primitives::{Address, U256};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Security parameter of the public params persisted alongside the public key
pub const PUBLIC_PARAMS_BITS: usize = 2048;

/// Accumulates cleartext values bound for one contract call
#[async_trait]
pub trait EncryptedInputBuilder: Send {
    fn add_bool(&mut self, value: bool) -> Result<()>;
    fn add_8(&mut self, value: u8) -> Result<()>;
    fn add_16(&mut self, value: u16) -> Result<()>;
    fn add_32(&mut self, value: u32) -> Result<()>;
    fn add_64(&mut self, value: u64) -> Result<()>;
    fn add_128(&mut self, value: u128) -> Result<()>;
    fn add_256(&mut self, value: U256) -> Result<()>;
    fn add_address(&mut self, value: Address) -> Result<()>;

    /// Produce handles and the input proof. Consumes the builder.
    async fn encrypt(self: Box<Self>) -> Result<EncryptedInput>;
}

/// Everything a backend needs to re-encrypt handles for a user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDecryptRequest {
    pub pairs: Vec<crate::DecryptRequest>,
    pub private_key: String,
    pub public_key: String,
    pub signature: String,
    pub contract_addresses: Vec<Address>,
    pub user_address: Address,
    pub start_timestamp: u64,
    pub duration_days: u64,
}

/// A ready backend. Owns the key material for the session.
#[async_trait]
pub trait FhevmInstance: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn create_encrypted_input(
        &self,
        contract_address: Address,
        user_address: Address,
    ) -> Result<Box<dyn EncryptedInputBuilder>>;

    /// Ephemeral keypair decryption results are re-encrypted under
    fn generate_keypair(&self) -> Result<Keypair>;

    /// Typed data the user signs to authorize decryption
    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Eip712Payload>;

    async fn user_decrypt(&self, request: UserDecryptRequest) -> Result<DecryptResult>;

    async fn public_decrypt(&self, handles: &[String]) -> Result<DecryptResult>;

    fn get_public_key(&self) -> Option<PublicKey>;

    fn get_public_params(&self, bits: usize) -> Option<PublicParams>;
}

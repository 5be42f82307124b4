// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{FhevmClient, FhevmError, Result};
use fhevm_data::{DataStore, InMemoryStore};
use fhevm_relayer::{ClearValue, EncryptedInput, FhevmType};
use std::sync::Arc;

/// Encrypts values for one contract and user with whatever client is current
pub struct Encryptor<S: DataStore = InMemoryStore> {
    client: Option<Arc<FhevmClient<S>>>,
    contract_address: Option<String>,
    user_address: Option<String>,
}

impl<S: DataStore> Encryptor<S> {
    pub fn new(
        client: Option<Arc<FhevmClient<S>>>,
        contract_address: Option<String>,
        user_address: Option<String>,
    ) -> Self {
        Self {
            client,
            contract_address,
            user_address,
        }
    }

    pub fn can_encrypt(&self) -> bool {
        self.client.as_ref().is_some_and(|c| c.is_ready())
            && self.contract_address.is_some()
            && self.user_address.is_some()
    }

    fn parts(&self) -> Result<(&FhevmClient<S>, &str, &str)> {
        match (&self.client, &self.contract_address, &self.user_address) {
            (Some(client), Some(contract), Some(user)) => {
                Ok((client.as_ref(), contract.as_str(), user.as_str()))
            }
            _ => Err(FhevmError::ClientNotReady),
        }
    }

    pub async fn encrypt(&self, value: ClearValue, ty: FhevmType) -> Result<EncryptedInput> {
        let (client, contract, user) = self.parts()?;
        client.encrypt(value, ty, contract, user).await
    }

    pub async fn encrypt_bool(&self, value: bool) -> Result<EncryptedInput> {
        let (client, contract, user) = self.parts()?;
        client.encrypt_bool(value, contract, user).await
    }

    pub async fn encrypt_u8(&self, value: u64) -> Result<EncryptedInput> {
        let (client, contract, user) = self.parts()?;
        client.encrypt_u8(value, contract, user).await
    }

    pub async fn encrypt_u16(&self, value: u64) -> Result<EncryptedInput> {
        let (client, contract, user) = self.parts()?;
        client.encrypt_u16(value, contract, user).await
    }

    pub async fn encrypt_u32(&self, value: u64) -> Result<EncryptedInput> {
        let (client, contract, user) = self.parts()?;
        client.encrypt_u32(value, contract, user).await
    }

    pub async fn encrypt_u64(&self, value: u64) -> Result<EncryptedInput> {
        let (client, contract, user) = self.parts()?;
        client.encrypt_u64(value, contract, user).await
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::compute_handle;
use alloy::{
    hex,
    primitives::{keccak256, Address, Bytes, B256, U256},
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use fhevm_relayer::{ClearValue, EncryptedInput, EncryptedInputBuilder, FhevmType};
use rand::Rng;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::debug;

/// Total plaintext bits one input may carry
pub const MAX_INPUT_BITS: usize = 2048;
/// Values per input. The proof stores the count in one byte.
pub const MAX_INPUT_VALUES: usize = 255;

pub type CleartextDb = Arc<RwLock<HashMap<String, ClearValue>>>;

pub struct MockInputBuilder {
    contract_address: Address,
    user_address: Address,
    acl_address: Address,
    chain_id: u64,
    values: Vec<(FhevmType, ClearValue)>,
    db: CleartextDb,
}

impl MockInputBuilder {
    pub fn new(
        contract_address: Address,
        user_address: Address,
        acl_address: Address,
        chain_id: u64,
        db: CleartextDb,
    ) -> Self {
        Self {
            contract_address,
            user_address,
            acl_address,
            chain_id,
            values: vec![],
            db,
        }
    }

    fn bits(&self) -> usize {
        self.values.iter().map(|(ty, _)| ty.bits()).sum()
    }

    fn push(&mut self, ty: FhevmType, value: ClearValue) -> Result<()> {
        if self.values.len() >= MAX_INPUT_VALUES {
            bail!("Too many values in one input (max {})", MAX_INPUT_VALUES);
        }
        if self.bits() + ty.bits() > MAX_INPUT_BITS {
            bail!("Input exceeds {} bits", MAX_INPUT_BITS);
        }
        self.values.push((ty, value));
        Ok(())
    }
}

fn to_word(value: &ClearValue) -> U256 {
    match value {
        ClearValue::Bool(v) => U256::from(*v as u8),
        ClearValue::Uint(v) => *v,
        ClearValue::Address(v) => U256::from_be_slice(v.as_slice()),
    }
}

#[async_trait]
impl EncryptedInputBuilder for MockInputBuilder {
    fn add_bool(&mut self, value: bool) -> Result<()> {
        self.push(FhevmType::Bool, value.into())
    }

    fn add_8(&mut self, value: u8) -> Result<()> {
        self.push(FhevmType::Uint8, (value as u64).into())
    }

    fn add_16(&mut self, value: u16) -> Result<()> {
        self.push(FhevmType::Uint16, (value as u64).into())
    }

    fn add_32(&mut self, value: u32) -> Result<()> {
        self.push(FhevmType::Uint32, (value as u64).into())
    }

    fn add_64(&mut self, value: u64) -> Result<()> {
        self.push(FhevmType::Uint64, value.into())
    }

    fn add_128(&mut self, value: u128) -> Result<()> {
        self.push(FhevmType::Uint128, value.into())
    }

    fn add_256(&mut self, value: U256) -> Result<()> {
        self.push(FhevmType::Uint256, value.into())
    }

    fn add_address(&mut self, value: Address) -> Result<()> {
        self.push(FhevmType::Address, value.into())
    }

    async fn encrypt(self: Box<Self>) -> Result<EncryptedInput> {
        if self.values.is_empty() {
            bail!("Encrypted input is empty");
        }

        let nonce: [u8; 32] = rand::thread_rng().gen();
        let mut blob = Vec::with_capacity(32 * (self.values.len() + 4));
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(self.contract_address.as_slice());
        blob.extend_from_slice(self.user_address.as_slice());
        blob.extend_from_slice(self.acl_address.as_slice());
        blob.extend_from_slice(&self.chain_id.to_be_bytes());
        for (ty, value) in &self.values {
            blob.push(ty.type_id());
            blob.extend_from_slice(&to_word(value).to_be_bytes::<32>());
        }
        let blob_hash: B256 = keccak256(&blob);

        let mut handles = Vec::with_capacity(self.values.len());
        let mut proof = vec![self.values.len() as u8, 0u8];
        {
            let mut db = self.db.write().await;
            for (index, (ty, value)) in self.values.iter().enumerate() {
                let handle = compute_handle(blob_hash, index as u8, *ty, self.chain_id);
                db.insert(hex::encode_prefixed(handle), value.clone());
                proof.extend_from_slice(handle.as_slice());
                handles.push(Bytes::copy_from_slice(handle.as_slice()));
            }
        }

        debug!(
            contract = %self.contract_address,
            count = handles.len(),
            "mock input encrypted"
        );

        Ok(EncryptedInput {
            handles,
            input_proof: Bytes::from(proof),
        })
    }
}

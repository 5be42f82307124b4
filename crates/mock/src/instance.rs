// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{normalize_handle, CleartextDb, MockInputBuilder};
use alloy::{
    hex,
    primitives::{keccak256, Address, Bytes},
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use fhevm_relayer::{
    BackendKind, DecryptResult, Eip712Payload, EncryptedInputBuilder, FhevmInstance, Keypair,
    MockInstanceParams, PublicKey, PublicParams, RelayerMetadata, UserDecryptRequest,
    PUBLIC_PARAMS_BITS,
};
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

const SECONDS_PER_DAY: u64 = 86_400;

/// Backend that keeps cleartexts in memory instead of encrypting them. Bound to the contract
/// addresses a local dev node reported.
pub struct MockFhevmInstance {
    rpc_url: String,
    chain_id: u64,
    metadata: RelayerMetadata,
    db: CleartextDb,
}

impl MockFhevmInstance {
    pub fn new(params: MockInstanceParams) -> Self {
        Self {
            rpc_url: params.rpc_url,
            chain_id: params.chain_id,
            metadata: params.metadata,
            db: CleartextDb::default(),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn metadata(&self) -> &RelayerMetadata {
        &self.metadata
    }

    async fn lookup(&self, handles: &[String]) -> Result<DecryptResult> {
        let db = self.db.read().await;
        let mut result = DecryptResult::new();
        for handle in handles {
            let value = db
                .get(&normalize_handle(handle))
                .ok_or_else(|| anyhow!("Unknown handle {}", handle))?;
            result.insert(handle.clone(), value.clone());
        }
        Ok(result)
    }

    fn key_material(&self, label: &str) -> Bytes {
        let mut preimage = label.as_bytes().to_vec();
        preimage.extend_from_slice(self.metadata.acl_address.as_slice());
        preimage.extend_from_slice(&self.chain_id.to_be_bytes());
        Bytes::copy_from_slice(keccak256(&preimage).as_slice())
    }
}

fn now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

#[async_trait]
impl FhevmInstance for MockFhevmInstance {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    fn create_encrypted_input(
        &self,
        contract_address: Address,
        user_address: Address,
    ) -> Result<Box<dyn EncryptedInputBuilder>> {
        Ok(Box::new(MockInputBuilder::new(
            contract_address,
            user_address,
            self.metadata.acl_address,
            self.chain_id,
            self.db.clone(),
        )))
    }

    fn generate_keypair(&self) -> Result<Keypair> {
        let private: [u8; 32] = rand::thread_rng().gen();
        let public = keccak256(private);
        Ok(Keypair {
            public_key: hex::encode(public),
            private_key: hex::encode(private),
        })
    }

    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Eip712Payload> {
        Eip712Payload::user_decrypt(
            self.chain_id,
            self.metadata.kms_verifier_address,
            public_key,
            contract_addresses,
            start_timestamp,
            duration_days,
        )
    }

    async fn user_decrypt(&self, request: UserDecryptRequest) -> Result<DecryptResult> {
        let payload = self.create_eip712(
            &request.public_key,
            &request.contract_addresses,
            request.start_timestamp,
            request.duration_days,
        )?;
        let signer = payload.recover_signer(&request.signature)?;
        if signer != request.user_address {
            warn!(%signer, user = %request.user_address, "decryption signature from wrong signer");
            bail!("Invalid EIP-712 signature");
        }

        let now = now()?;
        let expires_at = request
            .start_timestamp
            .saturating_add(request.duration_days.saturating_mul(SECONDS_PER_DAY));
        if now < request.start_timestamp || now >= expires_at {
            bail!("Decryption authorization is outside its validity window");
        }

        for pair in &request.pairs {
            if !request.contract_addresses.contains(&pair.contract_address) {
                bail!(
                    "Contract {} is not covered by the decryption authorization",
                    pair.contract_address
                );
            }
        }

        let handles: Vec<String> = request.pairs.iter().map(|p| p.handle.clone()).collect();
        debug!(count = handles.len(), "mock user decrypt");
        self.lookup(&handles).await
    }

    async fn public_decrypt(&self, handles: &[String]) -> Result<DecryptResult> {
        debug!(count = handles.len(), "mock public decrypt");
        self.lookup(handles).await
    }

    fn get_public_key(&self) -> Option<PublicKey> {
        Some(PublicKey {
            id: format!("mock-pk-{}", self.chain_id),
            data: self.key_material("public_key"),
        })
    }

    fn get_public_params(&self, bits: usize) -> Option<PublicParams> {
        if bits != PUBLIC_PARAMS_BITS {
            return None;
        }
        Some(PublicParams {
            id: format!("mock-crs-{}-{}", self.chain_id, bits),
            data: self.key_material("public_params"),
        })
    }
}

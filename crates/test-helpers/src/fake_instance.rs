// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::hardhat_metadata;
use alloy::primitives::Address;
use anyhow::Result;
use async_trait::async_trait;
use fhevm_mock::MockFhevmInstance;
use fhevm_relayer::{
    BackendKind, DecryptResult, Eip712Payload, EncryptedInputBuilder, FhevmInstance, Keypair,
    MockInstanceParams, PublicKey, PublicParams, UserDecryptRequest,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A working in-memory backend that counts how often it is reached
pub struct FakeInstance {
    kind: BackendKind,
    inner: MockFhevmInstance,
    public_key: Option<PublicKey>,
    inputs: AtomicUsize,
    user_decrypts: AtomicUsize,
    public_decrypts: AtomicUsize,
}

impl FakeInstance {
    pub fn new(kind: BackendKind, chain_id: u64) -> Self {
        let inner = MockFhevmInstance::new(MockInstanceParams {
            rpc_url: "http://fake".to_string(),
            chain_id,
            metadata: hardhat_metadata(),
        });
        let public_key = inner.get_public_key();
        Self {
            kind,
            inner,
            public_key,
            inputs: AtomicUsize::new(0),
            user_decrypts: AtomicUsize::new(0),
            public_decrypts: AtomicUsize::new(0),
        }
    }

    /// Reuse this key instead of deriving one
    pub fn with_public_key(mut self, public_key: Option<PublicKey>) -> Self {
        self.public_key = public_key;
        self
    }

    pub fn inputs_created(&self) -> usize {
        self.inputs.load(Ordering::SeqCst)
    }

    pub fn user_decrypts(&self) -> usize {
        self.user_decrypts.load(Ordering::SeqCst)
    }

    pub fn public_decrypts(&self) -> usize {
        self.public_decrypts.load(Ordering::SeqCst)
    }

    pub fn backend_calls(&self) -> usize {
        self.inputs_created() + self.user_decrypts() + self.public_decrypts()
    }
}

#[async_trait]
impl FhevmInstance for FakeInstance {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn create_encrypted_input(
        &self,
        contract_address: Address,
        user_address: Address,
    ) -> Result<Box<dyn EncryptedInputBuilder>> {
        self.inputs.fetch_add(1, Ordering::SeqCst);
        self.inner
            .create_encrypted_input(contract_address, user_address)
    }

    fn generate_keypair(&self) -> Result<Keypair> {
        self.inner.generate_keypair()
    }

    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Eip712Payload> {
        self.inner.create_eip712(
            public_key,
            contract_addresses,
            start_timestamp,
            duration_days,
        )
    }

    async fn user_decrypt(&self, request: UserDecryptRequest) -> Result<DecryptResult> {
        self.user_decrypts.fetch_add(1, Ordering::SeqCst);
        self.inner.user_decrypt(request).await
    }

    async fn public_decrypt(&self, handles: &[String]) -> Result<DecryptResult> {
        self.public_decrypts.fetch_add(1, Ordering::SeqCst);
        self.inner.public_decrypt(handles).await
    }

    fn get_public_key(&self) -> Option<PublicKey> {
        self.public_key.clone()
    }

    fn get_public_params(&self, bits: usize) -> Option<PublicParams> {
        self.inner.get_public_params(bits)
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use anyhow::{bail, Result};
use async_trait::async_trait;
use fhevm_relayer::{DecryptionSigner, Eip712Payload};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Signs with a real key and counts signature prompts
pub struct CountingSigner {
    inner: PrivateKeySigner,
    signatures: AtomicUsize,
}

impl CountingSigner {
    pub fn new(inner: PrivateKeySigner) -> Self {
        Self {
            inner,
            signatures: AtomicUsize::new(0),
        }
    }

    pub fn random() -> Self {
        Self::new(PrivateKeySigner::random())
    }

    pub fn signatures(&self) -> usize {
        self.signatures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecryptionSigner for CountingSigner {
    async fn address(&self) -> Result<Address> {
        DecryptionSigner::address(&self.inner).await
    }

    async fn sign_typed_data(&self, payload: &Eip712Payload) -> Result<String> {
        self.signatures.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_typed_data(payload).await
    }
}

/// A user who declines every signature prompt
pub struct RejectingSigner {
    address: Address,
    prompts: AtomicUsize,
}

impl RejectingSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecryptionSigner for RejectingSigner {
    async fn address(&self) -> Result<Address> {
        Ok(self.address)
    }

    async fn sign_typed_data(&self, _payload: &Eip712Payload) -> Result<String> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        bail!("User rejected the request")
    }
}

/// Answers every prompt with a fixed string
pub struct StaticSigner {
    address: Address,
    signature: String,
}

impl StaticSigner {
    pub fn new(address: Address, signature: impl Into<String>) -> Self {
        Self {
            address,
            signature: signature.into(),
        }
    }
}

#[async_trait]
impl DecryptionSigner for StaticSigner {
    async fn address(&self) -> Result<Address> {
        Ok(self.address)
    }

    async fn sign_typed_data(&self, _payload: &Eip712Payload) -> Result<String> {
        Ok(self.signature.clone())
    }
}

/// Claims one address but signs with another key
pub struct ImpostorSigner {
    claimed: Address,
    inner: PrivateKeySigner,
}

impl ImpostorSigner {
    pub fn new(claimed: Address) -> Self {
        Self {
            claimed,
            inner: PrivateKeySigner::random(),
        }
    }
}

#[async_trait]
impl DecryptionSigner for ImpostorSigner {
    async fn address(&self) -> Result<Address> {
        Ok(self.claimed)
    }

    async fn sign_typed_data(&self, payload: &Eip712Payload) -> Result<String> {
        self.inner.sign_typed_data(payload).await
    }
}

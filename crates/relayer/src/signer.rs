// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::Eip712Payload;
use alloy::{hex, primitives::Address, signers::local::PrivateKeySigner, signers::Signer};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A wallet able to sign EIP-712 typed data on behalf of the user
#[async_trait]
pub trait DecryptionSigner: Send + Sync {
    async fn address(&self) -> Result<Address>;

    /// Returns a 0x prefixed hex signature. Errors when the user declines.
    async fn sign_typed_data(&self, payload: &Eip712Payload) -> Result<String>;
}

#[async_trait]
impl DecryptionSigner for PrivateKeySigner {
    async fn address(&self) -> Result<Address> {
        Ok(Signer::address(self))
    }

    async fn sign_typed_data(&self, payload: &Eip712Payload) -> Result<String> {
        let signature = self.sign_hash(&payload.signing_hash()).await?;
        Ok(hex::encode_prefixed(signature.as_bytes()))
    }
}

#[async_trait]
impl<T: DecryptionSigner + ?Sized> DecryptionSigner for Arc<T> {
    async fn address(&self) -> Result<Address> {
        (**self).address().await
    }

    async fn sign_typed_data(&self, payload: &Eip712Payload) -> Result<String> {
        (**self).sign_typed_data(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[tokio::test]
    async fn test_private_key_signature_recovers() -> Result<()> {
        let signer = PrivateKeySigner::random();
        let payload = Eip712Payload::user_decrypt(
            11155111,
            address!("b6e160b1ff80d67bfe90a85ee06ce0a2613607d1"),
            "0x0102",
            &[address!("e43452762737f3858b54cff8c960af9fbe06b1ce")],
            1_700_000_000,
            365,
        )?;
        let signature = signer.sign_typed_data(&payload).await?;
        assert_eq!(signature.len(), 132);
        assert_eq!(
            payload.recover_signer(&signature)?,
            DecryptionSigner::address(&signer).await?
        );
        Ok(())
    }
}

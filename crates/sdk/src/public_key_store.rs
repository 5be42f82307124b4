// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{FhevmError, Result, StoreKeys};
use alloy::primitives::Address;
use fhevm_data::{DataStore, SharedStore};
use fhevm_relayer::{PublicKey, PublicParams};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Key material a backend needs to skip downloading it again
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPublicKey {
    pub public_key: Option<PublicKey>,
    pub public_params: Option<PublicParams>,
}

/// Public key cache keyed by the deployment's ACL contract address
pub struct PublicKeyStore<S: DataStore> {
    store: SharedStore<S>,
}

impl<S: DataStore> Clone for PublicKeyStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DataStore> PublicKeyStore<S> {
    pub fn new(store: SharedStore<S>) -> Self {
        Self { store }
    }

    /// Empty material when nothing was stored yet
    pub async fn get(&self, acl_address: &Address) -> Result<StoredPublicKey> {
        let stored = self
            .store
            .get::<StoredPublicKey>(&StoreKeys::public_key(acl_address))
            .await
            .map_err(FhevmError::Storage)?;
        debug!(acl = %acl_address, found = stored.is_some(), "public key lookup");
        Ok(stored.unwrap_or_default())
    }

    pub async fn set(
        &self,
        acl_address: &Address,
        public_key: Option<PublicKey>,
        public_params: Option<PublicParams>,
    ) -> Result<()> {
        let material = StoredPublicKey {
            public_key,
            public_params,
        };
        self.store
            .insert(&StoreKeys::public_key(acl_address), &material)
            .await
            .map_err(FhevmError::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;
    use fhevm_data::InMemoryStore;

    #[tokio::test]
    async fn test_roundtrip_and_default() -> Result<()> {
        let store = PublicKeyStore::new(SharedStore::new(InMemoryStore::new()));
        let acl = Address::repeat_byte(0x11);
        assert_eq!(store.get(&acl).await?, StoredPublicKey::default());

        let key = PublicKey {
            id: "pk".into(),
            data: Bytes::from_static(b"key"),
        };
        store.set(&acl, Some(key.clone()), None).await?;
        let stored = store.get(&acl).await?;
        assert_eq!(stored.public_key, Some(key));
        assert_eq!(stored.public_params, None);
        assert_eq!(
            store.get(&Address::repeat_byte(0x22)).await?,
            StoredPublicKey::default()
        );
        Ok(())
    }
}

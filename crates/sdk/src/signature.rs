// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{FhevmError, Result, StoreKeys};
use alloy::primitives::{keccak256, Address, B256};
use fhevm_config::{SignatureConfig, DEFAULT_DURATION_DAYS, DEFAULT_EXPIRY_MARGIN_SECS};
use fhevm_data::{DataStore, InMemoryStore, SharedStore};
use fhevm_relayer::{parse_signature, DecryptionSigner, FhevmInstance};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, info, instrument, warn};

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Source of the current unix time in seconds
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    })
}

/// A user's signed authorization to decrypt handles held by a set of contracts
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionSignature {
    public_key: String,
    private_key: String,
    signature: String,
    user_address: Address,
    contract_addresses: Vec<Address>,
    start_timestamp: u64,
    duration_days: u64,
}

impl DecryptionSignature {
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn user_address(&self) -> Address {
        self.user_address
    }

    /// In the order they were signed
    pub fn contract_addresses(&self) -> &[Address] {
        &self.contract_addresses
    }

    pub fn start_timestamp(&self) -> u64 {
        self.start_timestamp
    }

    pub fn duration_days(&self) -> u64 {
        self.duration_days
    }

    /// First second the signature is no longer valid
    pub fn expires_at(&self) -> u64 {
        self.start_timestamp
            .saturating_add(self.duration_days.saturating_mul(SECONDS_PER_DAY))
    }

    /// Valid when `now` lies in `[start, expiry)` and at least `margin` seconds remain
    pub fn is_valid_at(&self, now: u64, margin: u64) -> bool {
        now >= self.start_timestamp && now.saturating_add(margin) < self.expires_at()
    }
}

impl fmt::Debug for DecryptionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionSignature")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("signature", &self.signature)
            .field("user_address", &self.user_address)
            .field("contract_addresses", &self.contract_addresses)
            .field("start_timestamp", &self.start_timestamp)
            .field("duration_days", &self.duration_days)
            .finish()
    }
}

/// Drop repeated addresses keeping first occurrences in place
pub fn dedupe_addresses(addresses: &[Address]) -> Vec<Address> {
    let mut unique = Vec::with_capacity(addresses.len());
    for address in addresses {
        if !unique.contains(address) {
            unique.push(*address);
        }
    }
    unique
}

/// Order independent digest of a contract set
pub fn contracts_hash(addresses: &[Address]) -> B256 {
    let mut sorted = dedupe_addresses(addresses);
    sorted.sort();
    let mut preimage = Vec::with_capacity(sorted.len() * 20);
    for address in &sorted {
        preimage.extend_from_slice(address.as_slice());
    }
    keccak256(&preimage)
}

/// Identifies the backend's key so signatures never cross deployments
pub fn public_key_fingerprint(instance: &dyn FhevmInstance) -> B256 {
    match instance.get_public_key() {
        Some(public_key) => keccak256(&public_key.data),
        None => keccak256(instance.kind().to_string()),
    }
}

/// Persists decryption signatures and reuses them until they expire
pub struct SignatureCache<S: DataStore = InMemoryStore> {
    store: SharedStore<S>,
    duration_days: u64,
    expiry_margin_secs: u64,
    clock: Clock,
}

impl<S: DataStore> Clone for SignatureCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            duration_days: self.duration_days,
            expiry_margin_secs: self.expiry_margin_secs,
            clock: self.clock.clone(),
        }
    }
}

impl<S: DataStore> SignatureCache<S> {
    pub fn new(store: SharedStore<S>) -> Self {
        Self {
            store,
            duration_days: DEFAULT_DURATION_DAYS,
            expiry_margin_secs: DEFAULT_EXPIRY_MARGIN_SECS,
            clock: system_clock(),
        }
    }

    pub fn with_config(mut self, config: &SignatureConfig) -> Self {
        self.duration_days = config.duration_days;
        self.expiry_margin_secs = config.expiry_margin_secs;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    /// Return a stored signature for this user and contract set when one is still valid,
    /// otherwise ask the signer for a new one and store it.
    #[instrument(skip_all, fields(contracts = contract_addresses.len()))]
    pub async fn load_or_sign(
        &self,
        instance: &dyn FhevmInstance,
        contract_addresses: &[Address],
        signer: &dyn DecryptionSigner,
    ) -> Result<DecryptionSignature> {
        let contracts = dedupe_addresses(contract_addresses);
        if contracts.is_empty() {
            return Err(FhevmError::InvalidAddress(
                "at least one contract address is required".to_string(),
            ));
        }

        let user_address = signer
            .address()
            .await
            .map_err(|e| FhevmError::SigningRejected(format!("{:#}", e)))?;
        let key = StoreKeys::decryption_signature(
            &user_address,
            &contracts_hash(&contracts),
            &public_key_fingerprint(instance),
        );

        let now = (self.clock)();
        let cached = self
            .store
            .get::<DecryptionSignature>(&key)
            .await
            .map_err(FhevmError::Storage)?;
        if let Some(cached) = cached {
            if cached.user_address == user_address
                && cached.is_valid_at(now, self.expiry_margin_secs)
            {
                debug!(user = %user_address, "reusing cached decryption signature");
                return Ok(cached);
            }
            debug!(
                user = %user_address,
                expires_at = cached.expires_at(),
                "cached decryption signature is stale"
            );
        }

        let keypair = instance.generate_keypair().map_err(FhevmError::Backend)?;
        let payload = instance
            .create_eip712(&keypair.public_key, &contracts, now, self.duration_days)
            .map_err(FhevmError::Backend)?;

        info!(user = %user_address, "requesting decryption signature");
        let signature = signer
            .sign_typed_data(&payload)
            .await
            .map_err(|e| FhevmError::SigningRejected(format!("{:#}", e)))?;

        parse_signature(&signature)
            .map_err(|e| FhevmError::InvalidSignature(format!("{:#}", e)))?;
        let recovered = payload
            .recover_signer(&signature)
            .map_err(|e| FhevmError::InvalidSignature(format!("{:#}", e)))?;
        if recovered != user_address {
            warn!(%recovered, user = %user_address, "signature from unexpected signer");
            return Err(FhevmError::InvalidSignature(format!(
                "signed by {}, expected {}",
                recovered, user_address
            )));
        }

        let signed = DecryptionSignature {
            public_key: keypair.public_key.clone(),
            private_key: keypair.private_key.clone(),
            signature,
            user_address,
            contract_addresses: contracts,
            start_timestamp: now,
            duration_days: self.duration_days,
        };
        self.store
            .insert(&key, &signed)
            .await
            .map_err(FhevmError::Storage)?;
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(start_timestamp: u64, duration_days: u64) -> DecryptionSignature {
        DecryptionSignature {
            public_key: "00".into(),
            private_key: "11".into(),
            signature: "0x".into(),
            user_address: Address::ZERO,
            contract_addresses: vec![],
            start_timestamp,
            duration_days,
        }
    }

    #[test]
    fn test_validity_window() {
        let sig = signature(1_000, 1);
        assert_eq!(sig.expires_at(), 1_000 + SECONDS_PER_DAY);
        assert!(!sig.is_valid_at(999, 0));
        assert!(sig.is_valid_at(1_000, 0));
        assert!(sig.is_valid_at(sig.expires_at() - 1, 0));
        assert!(!sig.is_valid_at(sig.expires_at(), 0));
        assert!(!sig.is_valid_at(sig.expires_at() - 100, 300));
        assert!(!format!("{:?}", sig).contains("11"));
    }

    #[test]
    fn test_contract_set_is_order_independent() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        assert_eq!(contracts_hash(&[a, b]), contracts_hash(&[b, a, b]));
        assert_ne!(contracts_hash(&[a]), contracts_hash(&[a, b]));
        assert_eq!(dedupe_addresses(&[b, a, b]), vec![b, a]);
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    dedupe_addresses, ClientStatus, CreateOptions, FhevmEnvironment, FhevmError, Result,
    SignatureCache,
};
use alloy::primitives::{Address, U256};
use fhevm_data::{DataStore, InMemoryStore};
use fhevm_relayer::{
    BackendKind, ClearValue, DecryptRequest, DecryptResult, DecryptionSigner, EncryptedInput,
    FhevmInstance, FhevmType, PublicKey, UserDecryptRequest,
};
use std::{str::FromStr, sync::Arc};
use tracing::{debug, instrument};

struct Ready<S: DataStore> {
    instance: Arc<dyn FhevmInstance>,
    signatures: SignatureCache<S>,
}

/// Encrypts inputs for and decrypts results from FHEVM contracts.
///
/// A client is either ready, holding a backend, or was never constructed (`Default`) and
/// refuses every operation with [`FhevmError::ClientNotReady`]. It is never re-armed; create a
/// new one for a different connection.
pub struct FhevmClient<S: DataStore = InMemoryStore> {
    ready: Option<Ready<S>>,
}

impl<S: DataStore> Default for FhevmClient<S> {
    fn default() -> Self {
        Self { ready: None }
    }
}

impl<S: DataStore> FhevmClient<S> {
    /// Run client creation against `env` and wrap the resulting backend
    pub async fn create(env: &FhevmEnvironment<S>, options: CreateOptions) -> Result<Self> {
        let instance = env.create_instance(&options).await?;
        Ok(Self::from_instance(instance, env.signatures().clone()))
    }

    pub fn from_instance(instance: Arc<dyn FhevmInstance>, signatures: SignatureCache<S>) -> Self {
        Self {
            ready: Some(Ready {
                instance,
                signatures,
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }

    pub fn status(&self) -> ClientStatus {
        match self.ready {
            Some(_) => ClientStatus::Ready,
            None => ClientStatus::Idle,
        }
    }

    pub fn backend_kind(&self) -> Result<BackendKind> {
        Ok(self.ready()?.instance.kind())
    }

    pub fn public_key(&self) -> Result<Option<PublicKey>> {
        Ok(self.ready()?.instance.get_public_key())
    }

    /// The underlying backend for operations the client does not wrap
    pub fn instance(&self) -> Result<Arc<dyn FhevmInstance>> {
        Ok(self.ready()?.instance.clone())
    }

    fn ready(&self) -> Result<&Ready<S>> {
        self.ready.as_ref().ok_or(FhevmError::ClientNotReady)
    }

    /// Encrypt one value as `ty` for `contract_address` on behalf of `user_address`.
    /// Addresses and the value range are checked before the backend is involved.
    #[instrument(skip_all, fields(%ty))]
    pub async fn encrypt(
        &self,
        value: ClearValue,
        ty: FhevmType,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        let ready = self.ready()?;
        let contract_address = parse_address(contract_address)?;
        let user_address = parse_address(user_address)?;
        check_value(&value, ty)?;

        let mut input = ready
            .instance
            .create_encrypted_input(contract_address, user_address)
            .map_err(FhevmError::Backend)?;
        let added = match (ty, &value) {
            (FhevmType::Bool, ClearValue::Bool(v)) => input.add_bool(*v),
            (FhevmType::Uint8, ClearValue::Uint(v)) => input.add_8(narrow(ty, v)?),
            (FhevmType::Uint16, ClearValue::Uint(v)) => input.add_16(narrow(ty, v)?),
            (FhevmType::Uint32, ClearValue::Uint(v)) => input.add_32(narrow(ty, v)?),
            (FhevmType::Uint64, ClearValue::Uint(v)) => input.add_64(narrow(ty, v)?),
            (FhevmType::Uint128, ClearValue::Uint(v)) => input.add_128(narrow(ty, v)?),
            (FhevmType::Uint256, ClearValue::Uint(v)) => input.add_256(*v),
            (FhevmType::Address, ClearValue::Address(v)) => input.add_address(*v),
            _ => return Err(mismatch(ty, &value)),
        };
        added.map_err(FhevmError::Backend)?;

        let encrypted = input.encrypt().await.map_err(FhevmError::Backend)?;
        debug!(handles = encrypted.handles.len(), "value encrypted");
        Ok(encrypted)
    }

    /// [`FhevmClient::encrypt`] with the type given by its tag (`"uint32"`, `"bool"`, ...)
    pub async fn encrypt_tagged(
        &self,
        value: ClearValue,
        ty: &str,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        self.ready()?;
        let ty =
            FhevmType::from_str(ty).map_err(|_| FhevmError::UnsupportedType(ty.to_string()))?;
        self.encrypt(value, ty, contract_address, user_address)
            .await
    }

    pub async fn encrypt_bool(
        &self,
        value: bool,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        self.encrypt(value.into(), FhevmType::Bool, contract_address, user_address)
            .await
    }

    pub async fn encrypt_u8(
        &self,
        value: u64,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        self.encrypt(value.into(), FhevmType::Uint8, contract_address, user_address)
            .await
    }

    pub async fn encrypt_u16(
        &self,
        value: u64,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        self.encrypt(value.into(), FhevmType::Uint16, contract_address, user_address)
            .await
    }

    pub async fn encrypt_u32(
        &self,
        value: u64,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        self.encrypt(value.into(), FhevmType::Uint32, contract_address, user_address)
            .await
    }

    pub async fn encrypt_u64(
        &self,
        value: u64,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        self.encrypt(value.into(), FhevmType::Uint64, contract_address, user_address)
            .await
    }

    pub async fn encrypt_u128(
        &self,
        value: u128,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        self.encrypt(value.into(), FhevmType::Uint128, contract_address, user_address)
            .await
    }

    pub async fn encrypt_u256(
        &self,
        value: U256,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        self.encrypt(value.into(), FhevmType::Uint256, contract_address, user_address)
            .await
    }

    pub async fn encrypt_address(
        &self,
        value: &str,
        contract_address: &str,
        user_address: &str,
    ) -> Result<EncryptedInput> {
        self.ready()?;
        let value = parse_address(value)?;
        self.encrypt(value.into(), FhevmType::Address, contract_address, user_address)
            .await
    }

    /// Decrypt handles the user is allowed to see. Prompts `signer` only when no valid
    /// authorization for this contract set is cached.
    #[instrument(skip_all, fields(requests = requests.len()))]
    pub async fn user_decrypt(
        &self,
        requests: &[DecryptRequest],
        signer: &dyn DecryptionSigner,
    ) -> Result<DecryptResult> {
        let ready = self.ready()?;
        if requests.is_empty() {
            return Ok(DecryptResult::new());
        }

        let contracts: Vec<Address> = requests.iter().map(|r| r.contract_address).collect();
        let signature = ready
            .signatures
            .load_or_sign(ready.instance.as_ref(), &dedupe_addresses(&contracts), signer)
            .await?;

        ready
            .instance
            .user_decrypt(UserDecryptRequest {
                pairs: requests.to_vec(),
                private_key: signature.private_key().to_string(),
                public_key: signature.public_key().to_string(),
                signature: signature.signature().to_string(),
                contract_addresses: signature.contract_addresses().to_vec(),
                user_address: signature.user_address(),
                start_timestamp: signature.start_timestamp(),
                duration_days: signature.duration_days(),
            })
            .await
            .map_err(FhevmError::Backend)
    }

    /// Decrypt publicly decryptable handles. No signature involved.
    pub async fn public_decrypt(&self, handles: &[String]) -> Result<DecryptResult> {
        let ready = self.ready()?;
        if handles.is_empty() {
            return Ok(DecryptResult::new());
        }
        ready
            .instance
            .public_decrypt(handles)
            .await
            .map_err(FhevmError::Backend)
    }
}

/// `0x` followed by 40 hex digits
pub fn parse_address(address: &str) -> Result<Address> {
    let invalid = || FhevmError::InvalidAddress(address.to_string());
    let Some(digits) = address.strip_prefix("0x") else {
        return Err(invalid());
    };
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    Address::from_str(address).map_err(|_| invalid())
}

fn mismatch(ty: FhevmType, value: &ClearValue) -> FhevmError {
    FhevmError::TypeMismatch {
        ty,
        value: value.to_string(),
    }
}

fn check_value(value: &ClearValue, ty: FhevmType) -> Result<()> {
    match (ty, value) {
        (FhevmType::Bool, ClearValue::Bool(_)) => Ok(()),
        (FhevmType::Address, ClearValue::Address(_)) => Ok(()),
        (ty, ClearValue::Uint(v)) if ty.is_uint() => match ty.max_value() {
            Some(max) if *v > max => Err(FhevmError::ValueOutOfRange {
                ty,
                value: v.to_string(),
            }),
            _ => Ok(()),
        },
        _ => Err(mismatch(ty, value)),
    }
}

fn narrow<T: TryFrom<U256>>(ty: FhevmType, value: &U256) -> Result<T> {
    T::try_from(*value).map_err(|_| FhevmError::ValueOutOfRange {
        ty,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0xe43452762737f3858b54cff8c960af9fbe06b1ce").is_ok());
        assert!(parse_address("0xE43452762737F3858B54CFF8C960AF9FBE06B1CE").is_ok());
        for bad in [
            "",
            "0x",
            "e43452762737f3858b54cff8c960af9fbe06b1ce",
            "0xe43452762737f3858b54cff8c960af9fbe06b1c",
            "0xg43452762737f3858b54cff8c960af9fbe06b1ce",
        ] {
            assert!(matches!(
                parse_address(bad),
                Err(FhevmError::InvalidAddress(_))
            ));
        }
    }

    #[test]
    fn test_value_checks() {
        assert!(check_value(&255u64.into(), FhevmType::Uint8).is_ok());
        assert!(matches!(
            check_value(&256u64.into(), FhevmType::Uint8),
            Err(FhevmError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            check_value(&true.into(), FhevmType::Uint8),
            Err(FhevmError::TypeMismatch { .. })
        ));
        assert!(check_value(&U256::MAX.into(), FhevmType::Uint256).is_ok());
        assert!(matches!(
            check_value(&1u64.into(), FhevmType::Bool),
            Err(FhevmError::TypeMismatch { .. })
        ));
    }
}

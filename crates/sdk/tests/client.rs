// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod helpers;

use alloy::hex;
use alloy::primitives::{Address, U256};
use anyhow::Result;
use fhevm_data::{InMemoryStore, SharedStore};
use fhevm_relayer::{
    BackendKind, ClearValue, DecryptRequest, DecryptionSigner, FhevmInstance, FhevmType,
};
use fhevm_sdk::{ClientStatus, CreateOptions, FhevmClient, FhevmError, SignatureCache};
use fhevm_test_helpers::{
    CountingSigner, FakeInstance, RejectingSigner, CONTRACT, OTHER_CONTRACT, USER,
};
use helpers::*;
use std::sync::Arc;

fn client_with(instance: Arc<FakeInstance>) -> FhevmClient {
    FhevmClient::from_instance(
        instance,
        SignatureCache::new(SharedStore::new(InMemoryStore::new())),
    )
}

fn contract() -> String {
    CONTRACT.to_string()
}

fn user() -> String {
    USER.to_string()
}

#[tokio::test]
async fn test_uninitialized_client_is_not_ready() {
    let client = FhevmClient::<InMemoryStore>::default();

    assert!(!client.is_ready());
    assert_eq!(client.status(), ClientStatus::Idle);
    assert!(matches!(client.backend_kind(), Err(FhevmError::ClientNotReady)));
    assert!(matches!(client.public_key(), Err(FhevmError::ClientNotReady)));
    assert!(matches!(
        client.encrypt_u32(5, &contract(), &user()).await,
        Err(FhevmError::ClientNotReady)
    ));
    // readiness is checked before anything else
    assert!(matches!(
        client.encrypt_tagged(5u64.into(), "uint512", "0x12", "nope").await,
        Err(FhevmError::ClientNotReady)
    ));
    assert!(matches!(
        client.public_decrypt(&["0x01".to_string()]).await,
        Err(FhevmError::ClientNotReady)
    ));
    let signer = CountingSigner::random();
    assert!(matches!(
        client
            .user_decrypt(&[DecryptRequest::new("0x01", CONTRACT)], &signer)
            .await,
        Err(FhevmError::ClientNotReady)
    ));
    assert_eq!(signer.signatures(), 0);
}

#[tokio::test]
async fn test_encrypt_returns_handles_and_proof() -> Result<()> {
    let instance = Arc::new(FakeInstance::new(BackendKind::Mock, 31337));
    let client = client_with(instance.clone());

    let encrypted = client.encrypt_u32(5, &contract(), &user()).await?;

    assert_eq!(encrypted.handles.len(), 1);
    assert_eq!(encrypted.handles[0].len(), 32);
    assert!(!encrypted.input_proof.is_empty());
    assert_eq!(instance.inputs_created(), 1);
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_never_reaches_the_backend() {
    let instance = Arc::new(FakeInstance::new(BackendKind::Mock, 31337));
    let client = client_with(instance.clone());

    let result = client.encrypt_u8(256, &contract(), &user()).await;
    assert!(matches!(
        result,
        Err(FhevmError::ValueOutOfRange { ty: FhevmType::Uint8, .. })
    ));
    let result = client.encrypt_u16(70_000, &contract(), &user()).await;
    assert!(matches!(result, Err(FhevmError::ValueOutOfRange { .. })));
    let result = client
        .encrypt_u32(u64::from(u32::MAX) + 1, &contract(), &user())
        .await;
    assert!(matches!(result, Err(FhevmError::ValueOutOfRange { .. })));

    assert_eq!(instance.backend_calls(), 0);
}

#[tokio::test]
async fn test_boundary_values_are_accepted() -> Result<()> {
    let client = client_with(Arc::new(FakeInstance::new(BackendKind::Mock, 31337)));

    client.encrypt_u8(255, &contract(), &user()).await?;
    client.encrypt_u64(u64::MAX, &contract(), &user()).await?;
    client.encrypt_u128(u128::MAX, &contract(), &user()).await?;
    client.encrypt_u256(U256::MAX, &contract(), &user()).await?;
    client.encrypt_bool(true, &contract(), &user()).await?;
    client
        .encrypt_address(&OTHER_CONTRACT.to_string(), &contract(), &user())
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_unknown_type_tags_are_rejected() -> Result<()> {
    let instance = Arc::new(FakeInstance::new(BackendKind::Mock, 31337));
    let client = client_with(instance.clone());

    for tag in ["uint512", "euint32", "string", ""] {
        let result = client
            .encrypt_tagged(5u64.into(), tag, &contract(), &user())
            .await;
        assert!(
            matches!(result, Err(FhevmError::UnsupportedType(_))),
            "{tag}"
        );
    }
    assert_eq!(instance.backend_calls(), 0);

    client
        .encrypt_tagged(5u64.into(), "uint32", &contract(), &user())
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_mismatched_values_are_rejected() {
    let instance = Arc::new(FakeInstance::new(BackendKind::Mock, 31337));
    let client = client_with(instance.clone());

    let result = client
        .encrypt(ClearValue::Bool(true), FhevmType::Uint32, &contract(), &user())
        .await;
    assert!(matches!(result, Err(FhevmError::TypeMismatch { .. })));

    let result = client
        .encrypt(5u64.into(), FhevmType::Address, &contract(), &user())
        .await;
    assert!(matches!(result, Err(FhevmError::TypeMismatch { .. })));
    assert_eq!(instance.backend_calls(), 0);
}

#[tokio::test]
async fn test_malformed_addresses_are_rejected() {
    let instance = Arc::new(FakeInstance::new(BackendKind::Mock, 31337));
    let client = client_with(instance.clone());
    let short = "0x1234";
    let unprefixed = hex::encode(CONTRACT);
    let not_hex = format!("0x{}", "zz".repeat(20));

    for bad in [short, unprefixed.as_str(), not_hex.as_str()] {
        let result = client.encrypt_u32(5, bad, &user()).await;
        assert!(matches!(result, Err(FhevmError::InvalidAddress(_))), "{bad}");
        let result = client.encrypt_u32(5, &contract(), bad).await;
        assert!(matches!(result, Err(FhevmError::InvalidAddress(_))), "{bad}");
    }
    let result = client.encrypt_address(short, &contract(), &user()).await;
    assert!(matches!(result, Err(FhevmError::InvalidAddress(_))));

    assert_eq!(instance.backend_calls(), 0);
}

#[tokio::test]
async fn test_user_decrypt_signs_once() -> Result<()> {
    let instance = Arc::new(FakeInstance::new(BackendKind::Mock, 31337));
    let client = client_with(instance.clone());
    let signer = CountingSigner::random();
    let owner = DecryptionSigner::address(&signer).await?.to_string();

    let balance = client.encrypt_u64(1_000, &contract(), &owner).await?;
    let flag = client
        .encrypt_bool(true, &OTHER_CONTRACT.to_string(), &owner)
        .await?;
    let balance = hex::encode_prefixed(&balance.handles[0]);
    let flag = hex::encode_prefixed(&flag.handles[0]);
    let requests = vec![
        DecryptRequest::new(balance.clone(), CONTRACT),
        DecryptRequest::new(flag.clone(), OTHER_CONTRACT),
    ];

    let values = client.user_decrypt(&requests, &signer).await?;
    assert_eq!(values.get(&balance), Some(&ClearValue::Uint(U256::from(1_000u64))));
    assert_eq!(values.get(&flag), Some(&ClearValue::Bool(true)));

    let reversed: Vec<_> = requests.iter().rev().cloned().collect();
    let again = client.user_decrypt(&reversed, &signer).await?;
    assert_eq!(again, values);
    assert_eq!(signer.signatures(), 1);
    assert_eq!(instance.user_decrypts(), 2);
    Ok(())
}

#[tokio::test]
async fn test_user_decrypt_rejection() -> Result<()> {
    let instance = Arc::new(FakeInstance::new(BackendKind::Mock, 31337));
    let client = client_with(instance.clone());
    let encrypted = client.encrypt_u8(7, &contract(), &user()).await?;
    let handle = hex::encode_prefixed(&encrypted.handles[0]);

    let signer = RejectingSigner::new(USER);
    let result = client
        .user_decrypt(&[DecryptRequest::new(handle, CONTRACT)], &signer)
        .await;

    assert!(matches!(result, Err(FhevmError::SigningRejected(_))));
    assert_eq!(instance.user_decrypts(), 0);
    Ok(())
}

#[tokio::test]
async fn test_empty_requests_skip_the_backend() -> Result<()> {
    let instance = Arc::new(FakeInstance::new(BackendKind::Mock, 31337));
    let client = client_with(instance.clone());
    let signer = CountingSigner::random();

    assert!(client.user_decrypt(&[], &signer).await?.is_empty());
    assert!(client.public_decrypt(&[]).await?.is_empty());
    assert_eq!(signer.signatures(), 0);
    assert_eq!(instance.backend_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_public_decrypt() -> Result<()> {
    let instance = Arc::new(FakeInstance::new(BackendKind::Mock, 31337));
    let client = client_with(instance.clone());
    let encrypted = client.encrypt_u16(42, &contract(), &user()).await?;
    let handle = hex::encode_prefixed(&encrypted.handles[0]);

    let values = client.public_decrypt(&[handle.clone()]).await?;
    assert_eq!(values.get(&handle), Some(&ClearValue::Uint(U256::from(42u64))));

    let unknown = format!("0x{}", "00".repeat(32));
    let result = client.public_decrypt(&[unknown]).await;
    assert!(matches!(result, Err(FhevmError::Backend(_))));
    Ok(())
}

#[tokio::test]
async fn test_client_from_environment() -> Result<()> {
    let h = hardhat_harness();
    let client = FhevmClient::create(
        &h.env,
        CreateOptions::new(MOCK_URL).with_chain_id(31337),
    )
    .await?;

    assert_eq!(client.backend_kind()?, BackendKind::Mock);
    assert!(client.public_key()?.is_some());
    assert_ne!(client.instance()?.kind(), BackendKind::Relayer);

    let encrypted = client.encrypt_u32(5, &contract(), &user()).await?;
    assert!(!encrypted.handles.is_empty());
    assert!(!encrypted.input_proof.is_empty());

    let signer = CountingSigner::random();
    let owner: Address = DecryptionSigner::address(&signer).await?;
    let mine = client.encrypt_u32(9, &contract(), &owner.to_string()).await?;
    let handle = hex::encode_prefixed(&mine.handles[0]);
    let values = client
        .user_decrypt(&[DecryptRequest::new(handle.clone(), CONTRACT)], &signer)
        .await?;
    assert_eq!(values.get(&handle), Some(&ClearValue::Uint(U256::from(9u64))));
    Ok(())
}

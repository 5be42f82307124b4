// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod helpers;

use alloy::hex;
use alloy::primitives::U256;
use anyhow::Result;
use fhevm_data::InMemoryStore;
use fhevm_relayer::{BackendKind, ClearValue, DecryptRequest, DecryptionSigner};
use fhevm_sdk::bindings::{ClientController, Decryptor, Encryptor};
use fhevm_sdk::{ClientStatus, FhevmClient, FhevmError};
use fhevm_test_helpers::{CountingSigner, CONTRACT, USER};
use helpers::*;
use std::sync::Arc;

fn mock_controller(h: &Harness) -> ClientController {
    let controller = ClientController::new(h.env.clone());
    controller.set_connection(Some(MOCK_URL.into()), Some(31337));
    controller
}

#[tokio::test]
async fn test_controller_starts_idle() {
    let h = hardhat_harness();
    let controller = ClientController::new(h.env.clone());

    let state = controller.state();
    assert_eq!(state.status, ClientStatus::Idle);
    assert!(state.client.is_none());
    assert_eq!(h.mock_rpc.total_calls(), 0);
}

#[tokio::test]
async fn test_controller_reaches_ready() -> Result<()> {
    let h = hardhat_harness();
    let controller = mock_controller(&h);

    let state = controller.wait_settled().await;

    assert_eq!(state.status, ClientStatus::Ready);
    assert!(state.error.is_none());
    let client = state.client.expect("client should be set");
    assert_eq!(client.backend_kind()?, BackendKind::Mock);
    assert_eq!(controller.generation(), 1);
    Ok(())
}

#[tokio::test]
async fn test_controller_publishes_errors() {
    let h = hardhat_harness();
    h.relayer.fail_load(true);
    let controller = ClientController::new(h.env.clone());
    controller.set_connection(Some(SEPOLIA_URL.into()), None);

    let state = controller.wait_settled().await;

    assert_eq!(state.status, ClientStatus::Error);
    assert!(state.client.is_none());
    assert!(matches!(
        state.error.as_deref(),
        Some(FhevmError::BackendUnavailable(_))
    ));
}

#[tokio::test]
async fn test_refresh_creates_a_new_client() -> Result<()> {
    let h = hardhat_harness();
    let controller = mock_controller(&h);
    let first = controller.wait_settled().await;

    controller.refresh();
    assert_eq!(controller.generation(), 2);
    let second = controller.wait_settled().await;

    assert_eq!(second.status, ClientStatus::Ready);
    assert_eq!(h.mock_factory.creates(), 2);
    let (Some(a), Some(b)) = (first.client, second.client) else {
        anyhow::bail!("both generations should produce a client");
    };
    assert!(!Arc::ptr_eq(&a, &b));
    Ok(())
}

#[tokio::test]
async fn test_superseded_creation_is_dropped() -> Result<()> {
    let h = hardhat_harness();
    let controller = ClientController::new(h.env.clone());

    controller.set_connection(Some(SEPOLIA_URL.into()), None);
    controller.set_connection(Some(MOCK_URL.into()), Some(31337));
    let state = controller.wait_settled().await;

    assert_eq!(controller.generation(), 2);
    assert_eq!(state.status, ClientStatus::Ready);
    let client = state.client.expect("client should be set");
    assert_eq!(client.backend_kind()?, BackendKind::Mock);

    tokio::task::yield_now().await;
    let state = controller.state();
    assert_eq!(state.client.map(|c| c.backend_kind().ok()), Some(Some(BackendKind::Mock)));
    Ok(())
}

#[tokio::test]
async fn test_disabling_tears_the_client_down() {
    let h = hardhat_harness();
    let controller = mock_controller(&h);
    controller.wait_settled().await;

    controller.set_enabled(false);
    let state = controller.state();
    assert_eq!(state.status, ClientStatus::Idle);
    assert!(state.client.is_none());

    // no-op when unchanged
    controller.set_enabled(false);
    assert_eq!(controller.generation(), 2);

    controller.set_connection(None, None);
    assert_eq!(controller.state().status, ClientStatus::Idle);
    assert_eq!(h.mock_factory.creates(), 1);
}

#[tokio::test]
async fn test_encryptor_follows_the_client() -> Result<()> {
    let contract = Some(CONTRACT.to_string());
    let user = Some(USER.to_string());

    let missing = Encryptor::<InMemoryStore>::new(None, contract.clone(), user.clone());
    assert!(!missing.can_encrypt());
    assert!(matches!(
        missing.encrypt_u32(5).await,
        Err(FhevmError::ClientNotReady)
    ));

    let uninitialized = Arc::new(FhevmClient::<InMemoryStore>::default());
    let encryptor = Encryptor::new(Some(uninitialized), contract.clone(), user.clone());
    assert!(!encryptor.can_encrypt());

    let h = hardhat_harness();
    let controller = mock_controller(&h);
    let client = controller.wait_settled().await.client;

    let no_user = Encryptor::new(client.clone(), contract.clone(), None);
    assert!(!no_user.can_encrypt());

    let encryptor = Encryptor::new(client, contract, user);
    assert!(encryptor.can_encrypt());
    let encrypted = encryptor.encrypt_u8(200).await?;
    assert_eq!(encrypted.handles.len(), 1);
    assert!(matches!(
        encryptor.encrypt_u8(300).await,
        Err(FhevmError::ValueOutOfRange { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_decryptor_keeps_the_latest_results() -> Result<()> {
    let h = hardhat_harness();
    let controller = mock_controller(&h);
    let client = controller.wait_settled().await.client;

    let signer = Arc::new(CountingSigner::random());
    let owner = DecryptionSigner::address(signer.as_ref()).await?.to_string();
    let encryptor = Encryptor::new(client.clone(), Some(CONTRACT.to_string()), Some(owner));
    let encrypted = encryptor.encrypt_u32(77).await?;
    let handle = hex::encode_prefixed(&encrypted.handles[0]);

    let no_signer = Decryptor::new(client.clone(), None);
    assert!(matches!(
        no_signer
            .user_decrypt(&[DecryptRequest::new(handle.clone(), CONTRACT)])
            .await,
        Err(FhevmError::SigningRejected(_))
    ));

    let decryptor = Decryptor::new(client, Some(signer.clone()));
    assert!(decryptor.results().is_none());
    let values = decryptor
        .user_decrypt(&[DecryptRequest::new(handle.clone(), CONTRACT)])
        .await?;

    assert!(!decryptor.is_decrypting());
    assert_eq!(values.get(&handle), Some(&ClearValue::Uint(U256::from(77u64))));
    assert_eq!(decryptor.results(), Some(values));
    assert_eq!(signer.signatures(), 1);

    decryptor.clear_results();
    assert!(decryptor.results().is_none());

    let values = decryptor.public_decrypt(&[handle.clone()]).await?;
    assert_eq!(decryptor.results(), Some(values));
    assert_eq!(signer.signatures(), 1);
    Ok(())
}

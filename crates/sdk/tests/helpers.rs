// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

#![allow(dead_code)]

use fhevm_data::{InMemoryStore, SharedStore};
use fhevm_sdk::{ClientStatus, FhevmEnvironment};
use fhevm_test_helpers::{
    hardhat_metadata, FakeConnector, FakeMockFactory, FakeRelayerSdk, FakeRpc, RecordingObserver,
};
use std::sync::Arc;

pub const MOCK_URL: &str = "http://localhost:8545";
pub const SEPOLIA_URL: &str = "https://sepolia.example.org";
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

pub struct Harness {
    pub env: Arc<FhevmEnvironment>,
    pub relayer: Arc<FakeRelayerSdk>,
    pub mock_factory: Arc<FakeMockFactory>,
    pub connector: Arc<FakeConnector>,
    pub mock_rpc: Arc<FakeRpc>,
    pub chain_rpc: Arc<FakeRpc>,
    pub store: SharedStore<InMemoryStore>,
}

pub fn harness_with(mock_rpc: FakeRpc, relayer: FakeRelayerSdk) -> Harness {
    let mock_rpc = Arc::new(mock_rpc);
    let chain_rpc = Arc::new(FakeRpc::new().with_chain_id(SEPOLIA_CHAIN_ID));
    let connector = Arc::new(
        FakeConnector::new()
            .with_endpoint(MOCK_URL, mock_rpc.clone())
            .with_endpoint(SEPOLIA_URL, chain_rpc.clone()),
    );
    let relayer = Arc::new(relayer);
    let mock_factory = Arc::new(FakeMockFactory::new());
    let store = SharedStore::new(InMemoryStore::new());
    let env = FhevmEnvironment::new(connector.clone(), relayer.clone(), store.clone())
        .with_mock_factory(mock_factory.clone());

    Harness {
        env: Arc::new(env),
        relayer,
        mock_factory,
        connector,
        mock_rpc,
        chain_rpc,
        store,
    }
}

/// A hardhat node with FHE mock support on the default mock url
pub fn hardhat_harness() -> Harness {
    harness_with(
        FakeRpc::hardhat(31337, &hardhat_metadata()),
        FakeRelayerSdk::new(),
    )
}

pub fn recorder() -> RecordingObserver<ClientStatus> {
    RecordingObserver::new()
}

/// The status sequence of a creation that loads and initializes the SDK
pub fn cold_sequence() -> Vec<ClientStatus> {
    vec![
        ClientStatus::SdkLoading,
        ClientStatus::SdkLoaded,
        ClientStatus::SdkInitializing,
        ClientStatus::SdkInitialized,
        ClientStatus::Creating,
        ClientStatus::Ready,
    ]
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{address, Address};
use fhevm_relayer::RelayerMetadata;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const HARDHAT_CLIENT_VERSION: &str = "HardhatNetwork/2.22.19/@nomicfoundation/edr/0.8.0";
pub const ANVIL_CLIENT_VERSION: &str = "anvil/v1.0.0";

/// A contract and user pair with well formed 40 hex digit addresses
pub const CONTRACT: Address = address!("e43452762737f3858b54cff8c960af9fbe06b1ce");
pub const OTHER_CONTRACT: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
pub const USER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

pub fn hardhat_metadata() -> RelayerMetadata {
    RelayerMetadata {
        acl_address: address!("50157cffd6bbfa2dece204a89ec419c23ef5755d"),
        input_verifier_address: address!("901f8942346f7ab3a01f6d7613119bca447bb030"),
        kms_verifier_address: address!("1364cbbf2cdf5032c47d8226a6f6fbd2afcdacac"),
    }
}

/// Lock ignoring poisoning. A panicking test already failed.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fhevm_relayer::FhevmType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FhevmError {
    #[error("Could not determine the chain id: {0}")]
    UnreachableEndpoint(String),

    #[error("Invalid chain id {0}")]
    InvalidChainId(u64),

    #[error("Relayer SDK unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Operation cancelled")]
    OperationCancelled,

    #[error("FhevmClient not ready. Call create() first.")]
    ClientNotReady,

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Value {value} is out of range for {ty}")]
    ValueOutOfRange { ty: FhevmType, value: String },

    #[error("Value {value} cannot be encrypted as {ty}")]
    TypeMismatch { ty: FhevmType, value: String },

    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Storage error: {0}")]
    Storage(anyhow::Error),

    #[error(transparent)]
    Backend(anyhow::Error),
}

impl FhevmError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FhevmError::OperationCancelled)
    }
}

pub type Result<T, E = FhevmError> = std::result::Result<T, E>;

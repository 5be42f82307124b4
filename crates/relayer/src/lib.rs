// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Narrow interfaces to everything the client orchestrates but does not implement: the relayer
//! SDK, backend instances, JSON-RPC endpoints, injected providers and external signers.

pub mod eip712;
pub mod instance;
pub mod metadata;
pub mod mock;
pub mod rpc;
pub mod sdk;
pub mod signer;
pub mod types;

pub use eip712::*;
pub use instance::*;
pub use metadata::*;
pub use mock::*;
pub use rpc::*;
pub use sdk::*;
pub use signer::*;
pub use types::*;

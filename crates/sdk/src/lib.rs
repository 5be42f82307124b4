// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Client SDK for FHEVM contracts.
//!
//! The crate decides which FHE backend to talk to (a local mock node or the relayer network),
//! drives client creation through an observable status sequence and caches the user's
//! EIP-712 decryption authorization so repeated decryptions do not prompt the wallet again.

pub mod bindings;
mod cancel;
mod client;
mod error;
mod lifecycle;
mod network;
mod probe;
mod public_key_store;
mod selector;
mod signature;
mod status;
mod store_keys;

pub use cancel::*;
pub use client::*;
pub use error::*;
pub use lifecycle::*;
pub use network::*;
pub use probe::*;
pub use public_key_store::*;
pub use selector::*;
pub use signature::*;
pub use status::*;
pub use store_keys::*;

pub use fhevm_relayer as relayer;

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Reactive wrappers for applications that render client state: a controller that owns the
//! client lifecycle and publishes it over a `watch` channel, plus encrypt and decrypt helpers
//! bound to that client.

mod controller;
mod decryptor;
mod encryptor;

pub use controller::*;
pub use decryptor::*;
pub use encryptor::*;

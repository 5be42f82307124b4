// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod fake_instance;
mod fake_relayer;
mod fake_rpc;
mod observer;
mod signers;
mod utils;

pub use fake_instance::*;
pub use fake_relayer::*;
pub use fake_rpc::*;
pub use observer::*;
pub use signers::*;
pub use utils::*;

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod factory;
mod handle;
mod input;
mod instance;

pub use factory::*;
pub use handle::*;
pub use input::*;
pub use instance::*;

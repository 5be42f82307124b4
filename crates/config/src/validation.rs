// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::str::FromStr;

use crate::RpcUrl;

/// Clap value parser for RPC endpoints given on the command line
#[derive(Clone, Debug)]
pub struct ValidRpcUrl(RpcUrl);

impl FromStr for ValidRpcUrl {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ValidRpcUrl(RpcUrl::parse(s)?))
    }
}

impl From<ValidRpcUrl> for String {
    fn from(value: ValidRpcUrl) -> Self {
        value.0.url().to_string()
    }
}

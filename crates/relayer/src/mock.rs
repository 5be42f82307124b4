// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{FhevmInstance, RelayerMetadata};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockInstanceParams {
    pub rpc_url: String,
    pub chain_id: u64,
    pub metadata: RelayerMetadata,
}

/// Builds backends for local dev nodes that embed FHE mock logic. Only wired in when a mock
/// backend is compiled in.
#[async_trait]
pub trait MockInstanceFactory: Send + Sync {
    async fn create_mock_instance(
        &self,
        params: MockInstanceParams,
    ) -> Result<Arc<dyn FhevmInstance>>;
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::MockFhevmInstance;
use anyhow::Result;
use async_trait::async_trait;
use fhevm_relayer::{FhevmInstance, MockInstanceFactory, MockInstanceParams};
use std::sync::Arc;
use tracing::info;

/// Creates [`MockFhevmInstance`]s for hardhat nodes
#[derive(Clone, Copy, Debug, Default)]
pub struct HardhatMockFactory;

#[async_trait]
impl MockInstanceFactory for HardhatMockFactory {
    async fn create_mock_instance(
        &self,
        params: MockInstanceParams,
    ) -> Result<Arc<dyn FhevmInstance>> {
        info!(
            chain_id = params.chain_id,
            rpc_url = %params.rpc_url,
            acl = %params.metadata.acl_address,
            "creating mock fhevm instance"
        );
        Ok(Arc::new(MockFhevmInstance::new(params)))
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Key value storage used for decryption signatures and public key material.
///
/// No ordering or transactional guarantees are made beyond last-writer-wins per key.
#[async_trait]
pub trait DataStore: Send + Sync + 'static {
    async fn insert<T: Serialize + Send + Sync>(&mut self, key: &str, value: &T) -> Result<()>;

    async fn get<T: DeserializeOwned + Send + Sync>(&self, key: &str) -> Result<Option<T>>;

    async fn remove(&mut self, key: &str) -> Result<()>;
}

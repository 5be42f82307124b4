// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{sled_utils::get_or_open_db_tree, DataStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sled::Tree;
use std::path::Path;
use tracing::info;

/// Persistent store backed by a sled tree
pub struct SledStore {
    db: Tree,
}

impl SledStore {
    pub fn new(path: &Path, tree: &str) -> Result<Self> {
        info!("Starting SledStore with {:?}", path);
        let db = get_or_open_db_tree(path, tree)?;
        Ok(Self { db })
    }
}

#[async_trait]
impl DataStore for SledStore {
    async fn insert<T: Serialize + Send + Sync>(&mut self, key: &str, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value)
            .with_context(|| format!("Could not serialize value for {}", key))?;
        self.db
            .insert(key.as_bytes(), bytes)
            .context("Could not insert data into db")?;
        Ok(())
    }

    async fn get<T: DeserializeOwned + Send + Sync>(&self, key: &str) -> Result<Option<T>> {
        let res = self
            .db
            .get(key.as_bytes())
            .with_context(|| format!("Failed to fetch {}", key))?;
        res.map(|bytes| bincode::deserialize(&bytes))
            .transpose()
            .with_context(|| format!("Could not deserialize value for {}", key))
    }

    async fn remove(&mut self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .context("Could not remove data from db")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::close_all_connections;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sled_store_shares_path() -> Result<()> {
        let temp_dir = tempdir()?;
        let db_path = temp_dir.path().join("fhevm.db");

        let mut first = SledStore::new(&db_path, "signatures")?;
        let second = SledStore::new(&db_path, "signatures")?;
        let other_tree = SledStore::new(&db_path, "public_keys")?;

        first
            .insert("//decryption_signature/a", &vec![1u8, 2, 3])
            .await?;
        assert_eq!(
            second.get::<Vec<u8>>("//decryption_signature/a").await?,
            Some(vec![1, 2, 3])
        );
        assert!(other_tree
            .get::<Vec<u8>>("//decryption_signature/a")
            .await?
            .is_none());

        first.remove("//decryption_signature/a").await?;
        assert!(second
            .get::<Vec<u8>>("//decryption_signature/a")
            .await?
            .is_none());

        close_all_connections();
        Ok(())
    }
}

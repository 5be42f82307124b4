// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::DataStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryStore {
    data: HashMap<String, Vec<u8>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn insert<T: Serialize + Send + Sync>(&mut self, key: &str, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value)
            .with_context(|| format!("Could not serialize value for {}", key))?;
        self.data.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get<T: DeserializeOwned + Send + Sync>(&self, key: &str) -> Result<Option<T>> {
        self.data
            .get(key)
            .map(|bytes| bincode::deserialize(bytes))
            .transpose()
            .with_context(|| format!("Could not deserialize value for {}", key))
    }

    async fn remove(&mut self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() -> Result<()> {
        let mut store = InMemoryStore::new();
        assert!(store.get::<String>("//missing").await?.is_none());

        store.insert("//a", &"first".to_string()).await?;
        store.insert("//a", &"second".to_string()).await?;
        assert_eq!(store.get::<String>("//a").await?, Some("second".to_string()));
        assert_eq!(store.len(), 1);

        store.remove("//a").await?;
        assert!(store.is_empty());
        Ok(())
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::DataStore;
use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle over a store. Writers are serialized by the lock so concurrent writes to the
/// same key resolve to last-writer-wins.
pub struct SharedStore<S> {
    inner: Arc<RwLock<S>>,
}

impl<S: DataStore> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        SharedStore {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DataStore> SharedStore<S> {
    pub fn new(store: S) -> SharedStore<S> {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn insert<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<()> {
        self.inner.write().await.insert(key, value).await
    }

    pub async fn get<T: DeserializeOwned + Send + Sync>(&self, key: &str) -> Result<Option<T>> {
        self.inner.read().await.get(key).await
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.inner.write().await.remove(key).await
    }

    /// Run a closure against the underlying store while holding the read lock
    pub async fn inspect<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.inner.read().await)
    }
}

impl<S: DataStore + Default> Default for SharedStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;

    #[tokio::test]
    async fn test_clones_share_state() -> Result<()> {
        let store = SharedStore::new(InMemoryStore::new());
        let other = store.clone();

        store.insert("//k", &42u64).await?;
        assert_eq!(other.get::<u64>("//k").await?, Some(42));

        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.insert("//race", &i).await })
            })
            .collect();
        for handle in handles {
            handle.await??;
        }
        let last = other.get::<u64>("//race").await?;
        assert!(matches!(last, Some(v) if v < 8));
        assert_eq!(other.inspect(|s| s.len()).await, 2);
        Ok(())
    }
}

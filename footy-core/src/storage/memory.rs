use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{decode, KeyValueStore, StorageError};

/// In-process key-value store.
///
/// Clones share the same entries, so dropping every store built on top of a
/// `MemoryStore` and building new ones over a clone behaves like a restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    read_only: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with [`StorageError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Stores raw text under `key` without JSON encoding.
    pub async fn insert_raw(&self, key: &str, raw: impl Into<String>) {
        self.entries.write().await.insert(key.to_string(), raw.into());
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::ReadOnly);
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let entries = self.entries.read().await;
        entries.get(key).map(|raw| decode(key, raw)).transpose()
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.check_writable()?;
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Backend(e.to_string()))?;
        self.entries.write().await.insert(key.to_string(), raw);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set("k", &json!({"a": [1, 2]})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": [1, 2]})));

        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());

        // Removing again is fine
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("shared", &json!(1)).await.unwrap();
        assert_eq!(other.get("shared").await.unwrap(), Some(json!(1)));
        assert_eq!(other.keys().await.unwrap(), vec!["shared".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_value() {
        let store = MemoryStore::new();
        store.insert_raw("bad", "{not json").await;
        let err = store.get("bad").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let store = MemoryStore::new();
        store.set("k", &json!(1)).await.unwrap();
        store.set_read_only(true);

        assert!(matches!(
            store.set("k", &json!(2)).await,
            Err(StorageError::ReadOnly)
        ));
        assert!(matches!(store.remove("k").await, Err(StorageError::ReadOnly)));
        assert_eq!(store.get("k").await.unwrap(), Some(json!(1)));
    }
}

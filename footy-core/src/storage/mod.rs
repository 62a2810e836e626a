//! Durable key-value storage used by the favorites and profile stores.
//!
//! Values are JSON documents. Each key is owned by exactly one writer:
//!
//! | key            | writer          | contents                           |
//! |----------------|-----------------|------------------------------------|
//! | `@favorites`   | FavoritesStore  | array of players                   |
//! | `@user_data`   | ProfileStore    | profile (name, avatar, join date)  |
//! | `persist:root` | Session         | app settings + profile + favorites |

mod memory;

use async_trait::async_trait;
use serde_json::Value;

pub use memory::MemoryStore;

pub const FAVORITES_KEY: &str = "@favorites";
pub const USER_DATA_KEY: &str = "@user_data";
pub const PERSIST_ROOT_KEY: &str = "persist:root";

/// Errors that can occur reading or writing the key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend failed (I/O, database, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
    /// A stored value could not be decoded as JSON.
    #[error("corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
    /// The store refuses writes.
    #[error("storage is read-only")]
    ReadOnly,
}

/// Asynchronous string-keyed JSON storage that survives process restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` if nothing is stored there.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replaces the value under `key`.
    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Deletes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Lists every stored key, sorted.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

pub(crate) fn decode(key: &str, raw: &str) -> Result<Value, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

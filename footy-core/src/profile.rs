//! The local user's profile, persisted under [`USER_DATA_KEY`].

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::models::{Profile, DEFAULT_PROFILE_NAME};
use crate::storage::{KeyValueStore, StorageError, USER_DATA_KEY};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile name cannot be empty")]
    EmptyName,
    #[error("could not persist profile: {0}")]
    Persistence(#[from] StorageError),
}

pub struct ProfileStore {
    storage: Arc<dyn KeyValueStore>,
    profile: RwLock<Profile>,
    mutation: Mutex<()>,
}

impl ProfileStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            profile: RwLock::new(Profile::default()),
            mutation: Mutex::new(()),
        }
    }

    pub async fn profile(&self) -> Profile {
        self.profile.read().await.clone()
    }

    /// Hydrates the profile; unreadable data keeps the defaults.
    pub async fn load(&self) -> Profile {
        self.restore(None).await
    }

    /// Hydrates the profile, using `fallback` when nothing is stored under
    /// [`USER_DATA_KEY`].
    ///
    /// A profile that was not stored yet is written back so its join date
    /// stays fixed across restarts.
    pub async fn restore(&self, fallback: Option<Profile>) -> Profile {
        let _guard = self.mutation.lock().await;
        let stored = match self.storage.get(USER_DATA_KEY).await {
            Ok(Some(value)) => serde_json::from_value::<Profile>(value)
                .map_err(|e| tracing::warn!("Ignoring unreadable profile: {}", e))
                .ok(),
            Ok(None) => {
                let first = match fallback {
                    Some(profile) => profile,
                    None => self.profile().await,
                };
                self.save_first(&first).await;
                Some(first)
            }
            Err(e) => {
                tracing::warn!("Failed to load profile: {}", e);
                None
            }
        };

        let mut profile = self.profile.write().await;
        if let Some(stored) = stored {
            *profile = stored;
        }
        profile.clone()
    }

    async fn save_first(&self, profile: &Profile) {
        let result = match serde_json::to_value(profile) {
            Ok(value) => self.storage.set(USER_DATA_KEY, &value).await,
            Err(e) => Err(StorageError::Backend(e.to_string())),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to save new profile: {}", e);
        }
    }

    /// Points the avatar at a picked image.
    pub async fn set_avatar(&self, uri: impl Into<String>) -> Result<Profile, ProfileError> {
        let uri = uri.into();
        self.update(move |p| p.avatar = Some(uri)).await
    }

    pub async fn set_name(&self, name: &str) -> Result<Profile, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        let name = name.to_string();
        self.update(move |p| p.name = name).await
    }

    /// Clears the avatar and restores the default name. The join date stays.
    pub async fn reset(&self) -> Result<Profile, ProfileError> {
        self.update(|p| {
            p.avatar = None;
            p.name = DEFAULT_PROFILE_NAME.to_string();
        })
        .await
    }

    async fn update<F>(&self, apply: F) -> Result<Profile, ProfileError>
    where
        F: FnOnce(&mut Profile),
    {
        let _guard = self.mutation.lock().await;
        let mut updated = self.profile().await;
        apply(&mut updated);

        let value =
            serde_json::to_value(&updated).map_err(|e| StorageError::Backend(e.to_string()))?;
        self.storage.set(USER_DATA_KEY, &value).await?;

        *self.profile.write().await = updated.clone();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn store_over(storage: &MemoryStore) -> ProfileStore {
        ProfileStore::new(Arc::new(storage.clone()))
    }

    #[tokio::test]
    async fn test_load_defaults() {
        let storage = MemoryStore::new();
        let profile = store_over(&storage).load().await;
        assert_eq!(profile.name, DEFAULT_PROFILE_NAME);
        assert!(profile.avatar.is_none());
    }

    #[tokio::test]
    async fn test_updates_survive_restart() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);
        store.set_name("  Ana  ").await.unwrap();
        store.set_avatar("file:///photos/me.jpg").await.unwrap();
        let join_date = store.profile().await.join_date;

        let reloaded = store_over(&storage).load().await;
        assert_eq!(reloaded.name, "Ana");
        assert_eq!(reloaded.avatar.as_deref(), Some("file:///photos/me.jpg"));
        assert_eq!(reloaded.join_date, join_date);
    }

    #[tokio::test]
    async fn test_reset_keeps_join_date() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);
        store.set_name("Ana").await.unwrap();
        let before = store.profile().await;

        let after = store.reset().await.unwrap();
        assert_eq!(after.name, DEFAULT_PROFILE_NAME);
        assert!(after.avatar.is_none());
        assert_eq!(after.join_date, before.join_date);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);
        assert!(matches!(
            store.set_name("   ").await,
            Err(ProfileError::EmptyName)
        ));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_profile() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);
        storage.set_read_only(true);

        assert!(matches!(
            store.set_name("Ana").await,
            Err(ProfileError::Persistence(StorageError::ReadOnly))
        ));
        assert_eq!(store.profile().await.name, DEFAULT_PROFILE_NAME);
    }

    #[tokio::test]
    async fn test_first_load_fixes_join_date() {
        let storage = MemoryStore::new();
        let first = store_over(&storage).load().await;
        assert!(storage.get(USER_DATA_KEY).await.unwrap().is_some());

        let again = store_over(&storage).load().await;
        assert_eq!(again.join_date, first.join_date);
    }

    #[tokio::test]
    async fn test_restore_uses_fallback_when_missing() {
        let storage = MemoryStore::new();
        let pinned = Profile {
            avatar: None,
            name: "Ana".to_string(),
            join_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };

        let restored = store_over(&storage).restore(Some(pinned.clone())).await;
        assert_eq!(restored, pinned);

        // Stored data wins over the fallback
        let other = Profile::default();
        let restored = store_over(&storage).restore(Some(other)).await;
        assert_eq!(restored, pinned);
    }

    #[tokio::test]
    async fn test_unreadable_profile_ignored() {
        let storage = MemoryStore::new();
        storage.insert_raw(USER_DATA_KEY, r#"{"name": 42}"#).await;
        let profile = store_over(&storage).load().await;
        assert_eq!(profile.name, DEFAULT_PROFILE_NAME);
    }
}

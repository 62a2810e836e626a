//! The user's favorite players, persisted under [`FAVORITES_KEY`].
//!
//! Every mutation rewrites the whole list. A mutation becomes visible only
//! after the write succeeded; a failed write leaves the previous list in place.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::models::Player;
use crate::storage::{KeyValueStore, StorageError, FAVORITES_KEY};

pub const DUPLICATE_MESSAGE: &str = "Player is already in favorites";
pub const LOAD_FAILED: &str = "Failed to load favorites";
pub const ADD_FAILED: &str = "Failed to add to favorites";
pub const REMOVE_FAILED: &str = "Failed to remove from favorites";
pub const CLEAR_FAILED: &str = "Failed to clear favorites";

/// Errors returned by favorites mutations.
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    /// The player is already a favorite.
    #[error("Player is already in favorites: {0}")]
    Duplicate(String),
    /// Writing the list failed; nothing changed.
    #[error("could not persist favorites: {0}")]
    Persistence(#[from] StorageError),
}

/// Snapshot of the favorites list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FavoritesState {
    pub favorites: Vec<Player>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Outcome of [`FavoritesStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Sole writer of the persisted favorites list.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<FavoritesState>,
    // Serializes read-modify-persist cycles
    mutation: Mutex<()>,
}

impl FavoritesStore {
    /// Creates an empty store. Call [`load`](Self::load) to hydrate it.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: RwLock::new(FavoritesState::default()),
            mutation: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> FavoritesState {
        self.state.read().await.clone()
    }

    pub async fn favorites(&self) -> Vec<Player> {
        self.state.read().await.favorites.clone()
    }

    pub async fn is_favorite(&self, id: &str) -> bool {
        self.state.read().await.favorites.iter().any(|p| p.id == id)
    }

    pub async fn ids(&self) -> HashSet<String> {
        self.state
            .read()
            .await
            .favorites
            .iter()
            .map(|p| p.id.clone())
            .collect()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Hydrates the list from storage.
    ///
    /// Missing or unreadable data yields an empty list; this never fails.
    /// A failed storage read also sets `error`.
    pub async fn load(&self) -> Vec<Player> {
        let _guard = self.mutation.lock().await;
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        let mut failed = false;
        let favorites = match self.storage.get(FAVORITES_KEY).await {
            Ok(Some(value)) => decode_favorites(value),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("{}: {}", LOAD_FAILED, e);
                failed = true;
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} favorite(s)", favorites.len());

        let mut state = self.state.write().await;
        state.is_loading = false;
        if failed {
            state.error = Some(LOAD_FAILED.to_string());
        }
        state.favorites = favorites.clone();
        favorites
    }

    /// Appends `player` and returns the new list.
    pub async fn add(&self, player: Player) -> Result<Vec<Player>, FavoritesError> {
        let _guard = self.mutation.lock().await;
        let current = self.favorites().await;

        if current.iter().any(|p| p.id == player.id) {
            self.state.write().await.error = Some(DUPLICATE_MESSAGE.to_string());
            return Err(FavoritesError::Duplicate(player.id));
        }

        let mut updated = current;
        updated.push(player);
        self.commit(updated, ADD_FAILED).await
    }

    /// Removes the player with `id`. Removing a non-favorite is a no-op.
    pub async fn remove(&self, id: &str) -> Result<Vec<Player>, FavoritesError> {
        let _guard = self.mutation.lock().await;
        let mut updated = self.favorites().await;
        updated.retain(|p| p.id != id);
        self.commit(updated, REMOVE_FAILED).await
    }

    /// Empties the list.
    pub async fn clear(&self) -> Result<Vec<Player>, FavoritesError> {
        let _guard = self.mutation.lock().await;
        self.commit(Vec::new(), CLEAR_FAILED).await
    }

    /// Removes `player` if it is a favorite, adds it otherwise.
    pub async fn toggle(&self, player: Player) -> Result<Toggled, FavoritesError> {
        if self.is_favorite(&player.id).await {
            self.remove(&player.id).await?;
            Ok(Toggled::Removed)
        } else {
            self.add(player).await?;
            Ok(Toggled::Added)
        }
    }

    /// Persists `updated` and, only if that worked, publishes it.
    async fn commit(
        &self,
        updated: Vec<Player>,
        failure: &str,
    ) -> Result<Vec<Player>, FavoritesError> {
        let persisted = match serde_json::to_value(&updated) {
            Ok(value) => self.storage.set(FAVORITES_KEY, &value).await,
            Err(e) => Err(StorageError::Backend(e.to_string())),
        };

        let mut state = self.state.write().await;
        match persisted {
            Ok(()) => {
                state.favorites = updated.clone();
                state.error = None;
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!("{}: {}", failure, e);
                state.error = Some(failure.to_string());
                Err(FavoritesError::Persistence(e))
            }
        }
    }
}

/// Decodes a stored list, keeping the first entry for each id.
fn decode_favorites(value: Value) -> Vec<Player> {
    let players: Vec<Player> = match serde_json::from_value(value) {
        Ok(players) => players,
        Err(e) => {
            tracing::warn!("Ignoring unreadable favorites: {}", e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    players
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn player(id: &str) -> Player {
        Player::new(id, format!("Player {}", id), "Team", "Forward")
    }

    fn ids(players: &[Player]) -> Vec<&str> {
        players.iter().map(|p| p.id.as_str()).collect()
    }

    fn store_over(storage: &MemoryStore) -> FavoritesStore {
        FavoritesStore::new(Arc::new(storage.clone()))
    }

    async fn persisted_ids(storage: &MemoryStore) -> Vec<String> {
        let value = storage.get(FAVORITES_KEY).await.unwrap().unwrap();
        let players: Vec<Player> = serde_json::from_value(value).unwrap();
        players.into_iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);
        assert!(store.load().await.is_empty());

        let state = store.snapshot().await;
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_load_unparsable_is_empty() {
        let storage = MemoryStore::new();
        storage.insert_raw(FAVORITES_KEY, "][ not json").await;
        let store = store_over(&storage);
        assert!(store.load().await.is_empty());
        assert_eq!(store.snapshot().await.error.as_deref(), Some(LOAD_FAILED));

        storage
            .set(FAVORITES_KEY, &json!({"unexpected": "shape"}))
            .await
            .unwrap();
        assert!(store_over(&storage).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_collapses_duplicate_ids() {
        let storage = MemoryStore::new();
        let blob = serde_json::to_value(vec![player("1"), player("2"), player("1")]).unwrap();
        storage.set(FAVORITES_KEY, &blob).await.unwrap();

        let loaded = store_over(&storage).load().await;
        assert_eq!(ids(&loaded), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_add_remove_clear_sequence() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);
        store.load().await;

        let list = store.add(player("1")).await.unwrap();
        assert_eq!(ids(&list), vec!["1"]);

        let list = store.add(player("2")).await.unwrap();
        assert_eq!(ids(&list), vec!["1", "2"]);
        assert_eq!(persisted_ids(&storage).await, vec!["1", "2"]);

        let list = store.remove("1").await.unwrap();
        assert_eq!(ids(&list), vec!["2"]);
        assert_eq!(persisted_ids(&storage).await, vec!["2"]);

        let list = store.clear().await.unwrap();
        assert!(list.is_empty());
        assert!(persisted_ids(&storage).await.is_empty());
        assert!(store.favorites().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_duplicate_is_rejected() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);
        store.add(player("1")).await.unwrap();

        let err = store.add(player("1")).await.unwrap_err();
        assert!(matches!(err, FavoritesError::Duplicate(ref id) if id == "1"));
        assert!(err.to_string().contains("already in favorites"));

        let state = store.snapshot().await;
        assert_eq!(ids(&state.favorites), vec!["1"]);
        assert_eq!(state.error.as_deref(), Some(DUPLICATE_MESSAGE));
        assert_eq!(persisted_ids(&storage).await, vec!["1"]);

        store.clear_error().await;
        assert!(store.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);
        store.add(player("1")).await.unwrap();
        store.add(player("2")).await.unwrap();

        let first = store.remove("1").await.unwrap();
        let second = store.remove("1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(ids(&second), vec!["2"]);
        assert!(store.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_clear_when_already_empty() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);

        assert!(store.clear().await.unwrap().is_empty());
        assert!(store.clear().await.unwrap().is_empty());
        assert!(persisted_ids(&storage).await.is_empty());
    }

    #[tokio::test]
    async fn test_reload_after_restart() {
        let storage = MemoryStore::new();
        {
            let store = store_over(&storage);
            store.load().await;
            store.add(player("1")).await.unwrap();
            store.add(player("2")).await.unwrap();
        }

        let reloaded = store_over(&storage);
        let list = reloaded.load().await;
        assert_eq!(ids(&list), vec!["1", "2"]);
        assert_eq!(list.iter().filter(|p| p.id == "1").count(), 1);
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_previous_list() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);
        store.add(player("1")).await.unwrap();

        storage.set_read_only(true);

        let err = store.add(player("2")).await.unwrap_err();
        assert!(matches!(
            err,
            FavoritesError::Persistence(StorageError::ReadOnly)
        ));
        let state = store.snapshot().await;
        assert_eq!(ids(&state.favorites), vec!["1"]);
        assert_eq!(state.error.as_deref(), Some(ADD_FAILED));

        assert!(store.remove("1").await.is_err());
        assert_eq!(ids(&store.favorites().await), vec!["1"]);
        assert_eq!(
            store.snapshot().await.error.as_deref(),
            Some(REMOVE_FAILED)
        );

        assert!(store.clear().await.is_err());
        assert_eq!(ids(&store.favorites().await), vec!["1"]);

        storage.set_read_only(false);
        store.add(player("2")).await.unwrap();
        assert!(store.snapshot().await.error.is_none());
        assert_eq!(persisted_ids(&storage).await, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_duplicate() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);

        let (a, b) = tokio::join!(store.add(player("1")), store.add(player("1")));
        assert!(a.is_ok() != b.is_ok());

        let (c, d) = tokio::join!(store.add(player("2")), store.add(player("3")));
        assert!(c.is_ok() && d.is_ok());

        let list = store.favorites().await;
        assert_eq!(list.len(), 3);
        let unique: HashSet<_> = list.iter().map(|p| p.id.clone()).collect();
        assert_eq!(unique.len(), 3);
        assert_eq!(persisted_ids(&storage).await.len(), 3);
    }

    #[tokio::test]
    async fn test_toggle() {
        let storage = MemoryStore::new();
        let store = store_over(&storage);

        assert_eq!(store.toggle(player("1")).await.unwrap(), Toggled::Added);
        assert!(store.is_favorite("1").await);
        assert!(store.ids().await.contains("1"));

        assert_eq!(store.toggle(player("1")).await.unwrap(), Toggled::Removed);
        assert!(!store.is_favorite("1").await);
    }
}

//! Wiring for one running app: every store, built from injected collaborators.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::catalog::{CatalogCache, CatalogSource, SearchMode};
use crate::favorites::FavoritesStore;
use crate::filter::{self, FilterCriteria};
use crate::insights::{InsightRequester, InsightTask, TextGenerator, DEFAULT_INSIGHT_TIMEOUT};
use crate::models::{AppSettings, Player, Profile};
use crate::profile::ProfileStore;
use crate::storage::{KeyValueStore, StorageError, PERSIST_ROOT_KEY};

/// Knobs for [`Session::new`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub search_mode: SearchMode,
    pub insight_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            search_mode: SearchMode::default(),
            insight_timeout: DEFAULT_INSIGHT_TIMEOUT,
        }
    }
}

/// Everything kept under [`PERSIST_ROOT_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSnapshot {
    pub app: AppSettings,
    pub profile: Option<Profile>,
    pub favorites: Vec<Player>,
}

pub struct Session {
    storage: Arc<dyn KeyValueStore>,
    pub catalog: CatalogCache,
    pub favorites: FavoritesStore,
    pub profile: ProfileStore,
    pub insights: Arc<InsightRequester>,
    settings: RwLock<AppSettings>,
}

impl Session {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        storage: Arc<dyn KeyValueStore>,
        generator: Arc<dyn TextGenerator>,
        options: SessionOptions,
    ) -> Self {
        let insights =
            InsightRequester::new(generator).with_timeout(options.insight_timeout);

        Self {
            catalog: CatalogCache::new(source).with_search_mode(options.search_mode),
            favorites: FavoritesStore::new(Arc::clone(&storage)),
            profile: ProfileStore::new(Arc::clone(&storage)),
            insights: Arc::new(insights),
            settings: RwLock::new(AppSettings::default()),
            storage,
        }
    }

    /// Restores favorites, profile and settings from storage.
    ///
    /// The profile in the root snapshot stands in when `@user_data` holds
    /// nothing yet.
    pub async fn hydrate(&self) {
        match self.storage.keys().await {
            Ok(keys) => tracing::debug!("Hydrating from stored keys {:?}", keys),
            Err(e) => tracing::warn!("Failed to list stored keys: {}", e),
        }
        self.favorites.load().await;

        let root = match self.storage.get(PERSIST_ROOT_KEY).await {
            Ok(Some(value)) => decode_root(value),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", PERSIST_ROOT_KEY, e);
                None
            }
        };

        match root {
            Some(root) => {
                self.profile.restore(root.profile).await;
                *self.settings.write().await = root.app;
            }
            None => {
                self.profile.load().await;
            }
        }
    }

    pub async fn settings(&self) -> AppSettings {
        self.settings.read().await.clone()
    }

    /// Applies `change` to the settings and writes the root snapshot.
    ///
    /// The settings only change if the snapshot was written.
    pub async fn update_settings<F>(&self, change: F) -> Result<AppSettings, StorageError>
    where
        F: FnOnce(&mut AppSettings),
    {
        let mut settings = self.settings.write().await;
        let mut updated = settings.clone();
        change(&mut updated);

        self.write_root(updated.clone()).await?;
        *settings = updated.clone();
        Ok(updated)
    }

    /// Writes the root snapshot from the current state.
    pub async fn persist_root(&self) -> Result<(), StorageError> {
        let settings = self.settings().await;
        self.write_root(settings).await
    }

    async fn write_root(&self, app: AppSettings) -> Result<(), StorageError> {
        let snapshot = RootSnapshot {
            app,
            profile: Some(self.profile.profile().await),
            favorites: self.favorites.favorites().await,
        };
        let value =
            serde_json::to_value(&snapshot).map_err(|e| StorageError::Backend(e.to_string()))?;
        self.storage.set(PERSIST_ROOT_KEY, &value).await
    }

    /// The browse view: team, position, favorites-only and name filters.
    pub async fn browse(&self, criteria: &FilterCriteria) -> Vec<Player> {
        let players = self.catalog.snapshot().await.players;
        let favorite_ids = self.favorites.ids().await;
        filter::compose(&players, criteria, &favorite_ids)
    }

    /// A debounced insight loader sharing this session's requester.
    pub fn insight_task(&self) -> InsightTask {
        InsightTask::new(Arc::clone(&self.insights))
    }
}

fn decode_root(value: Value) -> Option<RootSnapshot> {
    serde_json::from_value(value)
        .map_err(|e| tracing::warn!("Ignoring unreadable {}: {}", PERSIST_ROOT_KEY, e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::insights::InsightError;
    use crate::models::Theme;
    use crate::storage::{MemoryStore, USER_DATA_KEY};
    use async_trait::async_trait;

    struct FixedCatalog(Vec<Player>);

    #[async_trait]
    impl CatalogSource for FixedCatalog {
        async fn fetch_players(&self) -> Result<Vec<Player>, CatalogError> {
            Ok(self.0.clone())
        }

        async fn fetch_player(&self, id: &str) -> Result<Player, CatalogError> {
            self.0
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(id.to_string()))
        }
    }

    struct Offline;

    #[async_trait]
    impl TextGenerator for Offline {
        async fn generate(&self, _prompt: &str) -> Result<String, InsightError> {
            Err(InsightError::NotConfigured)
        }
    }

    fn players() -> Vec<Player> {
        vec![
            Player::new("1", "Ana", "A", "Forward").with_year_of_birth(1995),
            Player::new("2", "Ben", "A", "Defender").with_year_of_birth(1996),
            Player::new("3", "Caio", "B", "Forward").with_year_of_birth(1990),
        ]
    }

    fn session(storage: &MemoryStore) -> Session {
        Session::new(
            Arc::new(FixedCatalog(players())),
            Arc::new(storage.clone()),
            Arc::new(Offline),
            SessionOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_hydrate_restores_everything() {
        let storage = MemoryStore::new();
        {
            let first = session(&storage);
            first.hydrate().await;
            first.favorites.add(players()[2].clone()).await.unwrap();
            first.profile.set_name("Ana").await.unwrap();
            first
                .update_settings(|s| s.theme = Theme::Dark)
                .await
                .unwrap();
        }

        let second = session(&storage);
        second.hydrate().await;
        assert_eq!(second.favorites.favorites().await, vec![players()[2].clone()]);
        assert_eq!(second.profile.profile().await.name, "Ana");
        assert_eq!(second.settings().await.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_join_date_survives_rehydration() {
        let storage = MemoryStore::new();
        let pinned = chrono::NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        let root = RootSnapshot {
            profile: Some(Profile {
                join_date: pinned,
                ..Profile::default()
            }),
            ..RootSnapshot::default()
        };
        storage
            .set(PERSIST_ROOT_KEY, &serde_json::to_value(&root).unwrap())
            .await
            .unwrap();

        let first = session(&storage);
        first.hydrate().await;
        assert_eq!(first.profile.profile().await.join_date, pinned);
        first.favorites.add(players()[0].clone()).await.unwrap();
        first.persist_root().await.unwrap();

        let second = session(&storage);
        second.hydrate().await;
        assert_eq!(second.profile.profile().await.join_date, pinned);
    }

    #[tokio::test]
    async fn test_first_hydrate_stores_profile() {
        let storage = MemoryStore::new();
        let first = session(&storage);
        first.hydrate().await;
        let joined = first.profile.profile().await.join_date;

        let second = session(&storage);
        second.hydrate().await;
        assert_eq!(second.profile.profile().await.join_date, joined);
        assert!(storage.get(USER_DATA_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_root_snapshot_contents() {
        let storage = MemoryStore::new();
        let session = session(&storage);
        session.favorites.add(players()[0].clone()).await.unwrap();
        session.persist_root().await.unwrap();

        let value = storage.get(PERSIST_ROOT_KEY).await.unwrap().unwrap();
        let root: RootSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(root.favorites.len(), 1);
        assert_eq!(root.app, AppSettings::default());
        assert!(root.profile.is_some());
    }

    #[tokio::test]
    async fn test_failed_settings_write_keeps_settings() {
        let storage = MemoryStore::new();
        let session = session(&storage);
        storage.set_read_only(true);

        assert!(session
            .update_settings(|s| s.language = "vi".to_string())
            .await
            .is_err());
        assert_eq!(session.settings().await.language, "en");
    }

    #[tokio::test]
    async fn test_browse_composes_with_favorites() {
        let storage = MemoryStore::new();
        let session = session(&storage);
        session.catalog.fetch_all().await.unwrap();
        session.favorites.add(players()[2].clone()).await.unwrap();

        let criteria = FilterCriteria::new()
            .with_position("Forward")
            .favorites_only(true);
        let view = session.browse(&criteria).await;
        assert_eq!(view, vec![players()[2].clone()]);
    }

    #[tokio::test]
    async fn test_insights_work_offline() {
        let storage = MemoryStore::new();
        let session = session(&storage);
        session.catalog.fetch_all().await.unwrap();
        let catalog = session.catalog.snapshot().await.players;

        let summary = session.insights.get_insights(&catalog[0]).await;
        assert!(summary.starts_with("Ana is a Forward for A."));

        let similar = session
            .insights
            .get_similar_players(&catalog[0], &catalog)
            .await;
        assert!(!similar.is_empty());
        assert!(similar.iter().all(|p| p.id != "1"));
    }
}

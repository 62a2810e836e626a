//! In-memory catalog of players and the view currently derived from it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::client::{CatalogError, CatalogSource};
use crate::filter;
use crate::models::{Player, TeamCount};

pub const FETCH_FAILED: &str = "Failed to fetch players";
pub const SEARCH_FAILED: &str = "Failed to search players";

/// Where [`CatalogCache::search_players`] gets the players it filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Refetch the player list, then filter it.
    #[default]
    Remote,
    /// Filter the cached players.
    Local,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Remote => write!(f, "remote"),
            SearchMode::Local => write!(f, "local"),
        }
    }
}

/// Snapshot of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogState {
    pub players: Vec<Player>,
    pub filtered_players: Vec<Player>,
    pub selected_team: Option<String>,
    pub teams: Vec<TeamCount>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub search_query: String,
}

impl CatalogState {
    fn team_view(&self) -> Vec<Player> {
        filter::by_team(&self.players, self.selected_team.as_deref())
    }
}

/// Caches the remote catalog. The catalog is never persisted: a restart
/// starts empty and refetches.
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    search_mode: SearchMode,
    state: RwLock<CatalogState>,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            search_mode: SearchMode::default(),
            state: RwLock::new(CatalogState::default()),
        }
    }

    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    pub async fn snapshot(&self) -> CatalogState {
        self.state.read().await.clone()
    }

    /// Replaces the catalog with the server's player list.
    ///
    /// On failure the previous players stay visible and `error` is set.
    pub async fn fetch_all(&self) -> Result<(), CatalogError> {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        let result = self.source.fetch_players().await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(players) => {
                state.teams = filter::team_counts(&players);
                state.filtered_players = players.clone();
                state.players = players;
                tracing::debug!("Catalog holds {} player(s)", state.players.len());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Fetching players failed: {}", e);
                state.error = Some(FETCH_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Shows only `team`'s players, or everyone for `None`.
    ///
    /// This replaces the view outright; an active search query is not applied.
    pub async fn set_selected_team(&self, team: Option<String>) {
        let mut state = self.state.write().await;
        state.selected_team = team;
        state.filtered_players = state.team_view();
    }

    /// Shows players whose name, team or position contains `query`.
    pub async fn search_players(&self, query: &str) -> Result<(), CatalogError> {
        let players = match self.search_mode {
            SearchMode::Local => self.state.read().await.players.clone(),
            SearchMode::Remote => match self.source.fetch_players().await {
                Ok(players) => players,
                Err(e) => {
                    tracing::warn!("Searching players failed: {}", e);
                    self.state.write().await.error = Some(SEARCH_FAILED.to_string());
                    return Err(e);
                }
            },
        };

        let matches = filter::search(&players, query);

        let mut state = self.state.write().await;
        state.filtered_players = matches;
        state.search_query = query.to_string();
        Ok(())
    }

    /// Drops the search and goes back to the team view.
    pub async fn clear_search(&self) {
        let mut state = self.state.write().await;
        state.search_query.clear();
        state.filtered_players = state.team_view();
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Fetches one player's latest record from the server.
    pub async fn fetch_player(&self, id: &str) -> Result<Player, CatalogError> {
        self.source.fetch_player(id).await.map_err(|e| {
            tracing::warn!("Fetching player {} failed: {}", id, e);
            e
        })
    }

    /// Looks a player up in the cached catalog.
    pub async fn find_player(&self, id: &str) -> Option<Player> {
        self.state
            .read()
            .await
            .players
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// The `count` players that follow `id` in catalog order.
    pub async fn next_players(&self, id: &str, count: usize) -> Vec<Player> {
        let state = self.state.read().await;
        match state.players.iter().position(|p| p.id == id) {
            Some(index) => state
                .players
                .iter()
                .skip(index + 1)
                .take(count)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Sorted distinct positions in the catalog.
    pub async fn positions(&self) -> Vec<String> {
        filter::positions(&self.state.read().await.players)
    }
}

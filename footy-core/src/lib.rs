//! footy core library
//!
//! Player catalog cache, persisted favorites, filtering and AI insights for
//! the footy client.

pub mod catalog;
pub mod favorites;
pub mod filter;
pub mod insights;
pub mod models;
pub mod profile;
pub mod session;
pub mod storage;

pub use catalog::{CatalogCache, CatalogClient, CatalogError, CatalogSource, CatalogState, SearchMode};
pub use favorites::{FavoritesError, FavoritesState, FavoritesStore, Toggled};
pub use filter::FilterCriteria;
pub use insights::{
    GeminiClient, GeminiConfig, InsightError, InsightRequester, InsightTask, PlayerInsight,
    TextGenerator,
};
pub use models::{AppSettings, Feedback, Player, Profile, TeamCount, Theme};
pub use profile::{ProfileError, ProfileStore};
pub use session::{RootSnapshot, Session, SessionOptions};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Remote player catalog and its in-memory cache.

mod cache;
mod client;

pub use cache::{CatalogCache, CatalogState, SearchMode, FETCH_FAILED, SEARCH_FAILED};
pub use client::{
    parse_player, parse_players, CatalogClient, CatalogError, CatalogSource, DEFAULT_API_BASE_URL,
    REQUEST_TIMEOUT,
};

//! HTTP client for the players API.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::Player;

/// Base URL of the hosted players API.
pub const DEFAULT_API_BASE_URL: &str = "https://685945b9138a18086dfdca1a.mockapi.io";
/// How long a single request may take before it is abandoned.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors talking to the players API.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(String),
    /// The request did not finish in time.
    #[error("request timed out")]
    Timeout,
    /// The server answered with a non-success status.
    #[error("server returned status {0}")]
    Status(u16),
    /// The body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// No player has the requested id.
    #[error("player not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CatalogError::Timeout
        } else if e.is_decode() {
            CatalogError::Malformed(e.to_string())
        } else {
            CatalogError::Network(e.to_string())
        }
    }
}

/// Where the catalog comes from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches every player, in server order.
    async fn fetch_players(&self) -> Result<Vec<Player>, CatalogError>;

    /// Fetches a single player by id.
    async fn fetch_player(&self, id: &str) -> Result<Player, CatalogError>;
}

/// `CatalogSource` backed by the REST players API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl CatalogClient {
    /// Creates a client for `base_url` whose requests time out after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn players_url(&self) -> String {
        format!("{}/players", self.base_url)
    }

    fn player_url(&self, id: &str) -> String {
        format!("{}/players/{}", self.base_url, urlencoding::encode(id))
    }

    async fn get_json(&self, url: &str) -> Result<Value, CatalogError> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_players(&self) -> Result<Vec<Player>, CatalogError> {
        let body = self.get_json(&self.players_url()).await?;
        let players = parse_players(body)?;
        tracing::debug!("Fetched {} player(s)", players.len());
        Ok(players)
    }

    async fn fetch_player(&self, id: &str) -> Result<Player, CatalogError> {
        let body = match self.get_json(&self.player_url(id)).await {
            Err(CatalogError::Status(404)) => return Err(CatalogError::NotFound(id.to_string())),
            other => other?,
        };
        parse_player(body)
    }
}

/// Parses a player list, dropping records that are malformed or repeat an id.
pub fn parse_players(body: Value) -> Result<Vec<Player>, CatalogError> {
    let records = match body {
        Value::Array(records) => records,
        other => {
            return Err(CatalogError::Malformed(format!(
                "expected an array of players, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut seen = HashSet::new();
    let mut players = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let player = match parse_player(record) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Dropping player record #{}: {}", index, e);
                continue;
            }
        };
        if !seen.insert(player.id.clone()) {
            tracing::warn!("Dropping player record #{}: duplicate id {}", index, player.id);
            continue;
        }
        players.push(player);
    }

    Ok(players)
}

/// Parses and validates a single player record.
pub fn parse_player(record: Value) -> Result<Player, CatalogError> {
    let player: Player =
        serde_json::from_value(record).map_err(|e| CatalogError::Malformed(e.to_string()))?;
    player
        .validate()
        .map_err(|e| CatalogError::Malformed(e.to_string()))?;
    Ok(player)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

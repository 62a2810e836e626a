//! Text generation backends used for player insights.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Errors from a text generation backend.
///
/// These never reach callers of [`InsightRequester`](super::InsightRequester);
/// they only decide when the local fallback is used.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    /// No API key is configured.
    #[error("text generation is not configured")]
    NotConfigured,
    #[error("network error: {0}")]
    Network(String),
    #[error("text generation timed out")]
    Timeout,
    #[error("server returned status {0}")]
    Status(u16),
    /// The response had no usable text.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for InsightError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InsightError::Timeout
        } else if e.is_decode() {
            InsightError::Malformed(e.to_string())
        } else {
            InsightError::Network(e.to_string())
        }
    }
}

/// Turns a prompt into free-form text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, InsightError>;
}

/// Settings for [`GeminiClient`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            timeout_secs: 15,
        }
    }
}

impl GeminiConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Google Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, InsightError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InsightError::Network(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn url(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model,
            urlencoding::encode(api_key)
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, InsightError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(InsightError::NotConfigured),
        };

        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self.http.post(self.url(api_key)).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = response.json().await?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateResponse) -> Result<String, InsightError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| InsightError::Malformed("no candidate text".to_string()))
}

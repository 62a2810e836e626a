use footy_core::catalog::{DEFAULT_API_BASE_URL, REQUEST_TIMEOUT};
use footy_core::{GeminiConfig, SearchMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite database holding favorites, profile and settings
    pub database_path: ConfigValue<PathBuf>,
    /// Base URL of the player API
    pub api_base_url: ConfigValue<String>,
    /// Timeout for player API requests
    pub request_timeout_secs: ConfigValue<u64>,
    /// Whether search refetches the catalog or filters the cached one
    pub search_mode: ConfigValue<SearchMode>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// AI insight settings
    pub ai: GeminiConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    search_mode: Option<SearchMode>,
    ai: Option<GeminiConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut database_path = ConfigValue::new(
            Self::default_data_dir().join("footy.db"),
            ConfigSource::Default,
        );
        let mut api_base_url =
            ConfigValue::new(DEFAULT_API_BASE_URL.to_string(), ConfigSource::Default);
        let mut request_timeout_secs =
            ConfigValue::new(REQUEST_TIMEOUT.as_secs(), ConfigSource::Default);
        let mut search_mode = ConfigValue::new(SearchMode::default(), ConfigSource::Default);
        let mut config_file = None;
        let mut ai = GeminiConfig::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.database_path {
                // Resolve relative paths against config file's directory
                let resolved_path = if db_path.is_relative() {
                    path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
                } else {
                    db_path
                };
                database_path = ConfigValue::new(resolved_path, ConfigSource::File);
            }
            if let Some(url) = file_config.api_base_url {
                api_base_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(secs) = file_config.request_timeout_secs {
                request_timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
            if let Some(mode) = file_config.search_mode {
                search_mode = ConfigValue::new(mode, ConfigSource::File);
            }
            if let Some(ai_config) = file_config.ai {
                ai = ai_config;
            }
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("FOOTY_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("FOOTY_API_URL") {
            api_base_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(key) = std::env::var("FOOTY_AI_API_KEY") {
            ai.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("FOOTY_AI_MODEL") {
            ai.model = model;
        }

        Ok(Self {
            database_path,
            api_base_url,
            request_timeout_secs,
            search_mode,
            config_file,
            ai,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.value)
    }

    pub fn insight_timeout(&self) -> Duration {
        Duration::from_secs(self.ai.timeout_secs)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/footy/
    /// - macOS: ~/Library/Application Support/footy/
    /// - Windows: %APPDATA%/footy/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("footy")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/footy/
    /// - macOS: ~/Library/Application Support/footy/
    /// - Windows: %APPDATA%/footy/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("footy")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

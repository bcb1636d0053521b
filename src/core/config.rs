//! Configuration for the chat backend.
//!
//! Values come from the process environment; a `.env` file in the working
//! directory is loaded first when present.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::errors::{AppError, AppResult};

/// Environment variable for the listen port.
const PORT_ENV: &str = "AGENCY_PORT";
/// Environment variable for the `SQLite` file path.
const DATABASE_PATH_ENV: &str = "AGENCY_DATABASE_PATH";
/// Environment variable for the document folder.
const DOCUMENTS_DIR_ENV: &str = "AGENCY_DOCUMENTS_DIR";
/// Environment variable for the static asset folder.
const STATIC_DIR_ENV: &str = "AGENCY_STATIC_DIR";
/// Environment variable for the recent-turn window.
const HISTORY_WINDOW_ENV: &str = "AGENCY_HISTORY_WINDOW";
/// Environment variable for the Gemini API key.
const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable for the Gemini model identifier.
const MODEL_ENV: &str = "AGENCY_MODEL";
/// Environment variable for the Gemini API base URL.
const BASE_URL_ENV: &str = "AGENCY_GEMINI_BASE_URL";
/// Environment variable for the cart idle lifetime in seconds.
const CART_IDLE_TTL_ENV: &str = "AGENCY_CART_IDLE_TTL_SECS";
/// Environment variable for the maximum number of live carts.
const MAX_CARTS_ENV: &str = "AGENCY_MAX_CARTS";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub storage: StorageConfig,
    /// Knowledge and conversation window settings.
    pub knowledge: KnowledgeConfig,
    /// Hosted model settings.
    pub gemini: GeminiConfig,
    /// Cart session settings.
    pub shop: ShopConfig,
}

impl AppConfig {
    /// Build the configuration from environment variables over the defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting configuration is invalid.
    pub fn from_env() -> AppResult<Self> {
        // A missing .env file is the normal case in production.
        let _ = dotenv::dotenv();

        let mut config = Self::default();
        if let Some(port) = parse_env::<u16>(PORT_ENV)? {
            config.server.port = port;
        }
        if let Some(dir) = read_env(STATIC_DIR_ENV) {
            config.server.static_dir = PathBuf::from(dir);
        }
        if let Some(path) = read_env(DATABASE_PATH_ENV) {
            config.storage.sqlite_path = PathBuf::from(path);
        }
        if let Some(dir) = read_env(DOCUMENTS_DIR_ENV) {
            config.knowledge.documents_dir = PathBuf::from(dir);
        }
        if let Some(window) = parse_env::<usize>(HISTORY_WINDOW_ENV)? {
            config.knowledge.history_window = window;
        }
        config.gemini.api_key = read_env(API_KEY_ENV);
        if let Some(model) = read_env(MODEL_ENV) {
            config.gemini.model = model;
        }
        if let Some(base_url) = read_env(BASE_URL_ENV) {
            config.gemini.base_url = base_url;
        }
        if let Some(ttl) = parse_env::<u64>(CART_IDLE_TTL_ENV)? {
            config.shop.cart_idle_ttl_secs = ttl;
        }
        if let Some(max) = parse_env::<usize>(MAX_CARTS_ENV)? {
            config.shop.max_carts = max;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.port == 0 {
            return Err(AppError::InvalidConfig("server.port must be > 0".to_string()));
        }

        if self.knowledge.history_window == 0 {
            return Err(AppError::InvalidConfig(
                "knowledge.history_window must be > 0".to_string(),
            ));
        }

        if self.gemini.model.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "gemini.model must not be empty".to_string(),
            ));
        }

        Url::parse(&self.gemini.base_url)?;

        if self.shop.cart_idle_ttl_secs == 0 || self.shop.max_carts == 0 {
            return Err(AppError::InvalidConfig(
                "shop.cart_idle_ttl_secs and shop.max_carts must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
    /// Folder holding `index.html` and the chat widget assets.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Database settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("instance/database.db"),
        }
    }
}

/// Knowledge and conversation window settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Folder scanned for PDF documents on every chat request.
    pub documents_dir: PathBuf,
    /// Number of recent turns included in the prompt.
    pub history_window: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("knowledge_docs"),
            history_window: 6,
        }
    }
}

/// Hosted model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; generation fails without it.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// API base URL.
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// Cart session settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Seconds a cart may sit untouched before it is discarded.
    pub cart_idle_ttl_secs: u64,
    /// Upper bound on carts held in memory; the least recently used go first.
    pub max_carts: usize,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            cart_idle_ttl_secs: 24 * 60 * 60,
            max_carts: 10_000,
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T: FromStr>(name: &str) -> AppResult<Option<T>> {
    read_env(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| AppError::InvalidConfig(format!("{name} has invalid value `{raw}`")))
        })
        .transpose()
}

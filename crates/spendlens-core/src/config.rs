//! Environment-derived configuration
//!
//! All process-wide configuration is read exactly once at startup via
//! [`Config::from_env`] and passed down explicitly. Nothing else in the
//! crate reads environment variables at call sites.
//!
//! Variables:
//! - `MONGODB_URI`: store connection string (default: mongodb://localhost:27017)
//! - `SPENDLENS_DB`: database name (default: financebot)
//! - `GEMINI_API_KEY`: model API key (required)
//! - `GEMINI_MODEL`: default model name (default: gemini-1.5-pro)

use crate::error::{Error, Result};

/// Default store connection string when `MONGODB_URI` is unset
pub const DEFAULT_STORE_URI: &str = "mongodb://localhost:27017";

/// Database holding the transactions collection
pub const DEFAULT_DATABASE: &str = "financebot";

/// Default generative model
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Document store connection settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection string
    pub uri: String,
    /// Database name
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_STORE_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

/// Generative model settings
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// API key for the hosted model
    pub api_key: String,
    /// Default model name (per-persona overrides may replace it)
    pub model: String,
}

/// Complete process configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub model: ModelConfig,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// A missing `GEMINI_API_KEY` is a fatal configuration error; every
    /// other variable has a default.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Config("GEMINI_API_KEY not found in environment".into()))?;

        Ok(Self {
            store: StoreConfig::from_env(),
            model: ModelConfig {
                api_key,
                model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            },
        })
    }
}

impl StoreConfig {
    /// Load store settings from the environment (all optional)
    pub fn from_env() -> Self {
        Self {
            uri: std::env::var("MONGODB_URI").unwrap_or_else(|_| DEFAULT_STORE_URI.to_string()),
            database: std::env::var("SPENDLENS_DB")
                .unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
        }
    }
}

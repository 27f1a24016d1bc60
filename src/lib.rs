//! Components Hub: a catalog builder for community components
//!
//! This crate discovers community-built components from three public sources
//! (the forum tracker thread, the PyPI index, and GitHub), merges the mentions
//! into one record per component, and enriches each record best-effort with
//! repository metadata, download metrics and curated data.

pub mod catalog;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod pipeline;

use thiserror::Error;

/// Main error type for Components Hub operations
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTML parse error for {context}: {message}")]
    HtmlParse { context: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingToken(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Components Hub operations
pub type Result<T> = std::result::Result<T, HubError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Catalog, ComponentRecord, RecordStage};
pub use config::Config;
pub use fetch::{FetchOutcome, Fetcher};

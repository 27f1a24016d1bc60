//! Configuration module for Components Hub
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use components_hub::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Tracker thread: {}", config.sources.tracker_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheConfig, Config, CuratedConfig, OutputConfig, RateLimitConfig, SourcesConfig,
};

// Re-export parser functions
pub use parser::load_config;

//! Pyrite Configuration System
//!
//! Provides configuration management for Pyrite analysis runs including:
//! - Project configuration (pyrite.toml)
//! - Global user configuration (~/.pyrite/config.toml)
//! - Configuration precedence and merging
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.pyrite/config.toml)
//! 2. Project config (./pyrite.toml)
//! 3. Environment variables (PYRITE_*)
//! 4. Caller overrides
//!
//! # Example
//!
//! ```no_run
//! use pyrite_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("max inference depth: {}", config.max_depth());
//! ```

pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default recursion limit for the inference context
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Upper bound accepted for `inference.max_depth`
pub const MAX_DEPTH_LIMIT: usize = 4096;

/// Default log level when nothing else is configured
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Check if a log level name is recognised
pub(crate) fn is_valid_log_level(level: &str) -> bool {
    matches!(
        level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

// Re-export main types
pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::ProjectConfig;

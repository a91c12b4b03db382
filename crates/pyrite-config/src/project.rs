//! Project Configuration (pyrite.toml)
//!
//! Handles project-level configuration stored in `pyrite.toml` at the project root.

use crate::{is_valid_log_level, ConfigError, ConfigResult, MAX_DEPTH_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project configuration from pyrite.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectMeta>,

    /// Inference engine limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference: Option<InferenceConfig>,

    /// Brain plugin toggles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brain: Option<BrainConfig>,

    /// Logging configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<LogConfig>,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectMeta {
    /// Project name
    pub name: String,

    /// Source roots, relative to the project root
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_roots: Vec<String>,
}

/// Inference engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct InferenceConfig {
    /// Maximum nesting of inference requests before giving up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

/// Brain plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BrainConfig {
    /// Enable the functools brain (lru_cache)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functools: Option<bool>,

    /// Also recognise decorators applied without a call (`@lru_cache`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bare_decorators: Option<bool>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Minimum level (trace, debug, info, warn, error, off)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(project) = &self.project {
            if project.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "project.name".to_string(),
                    reason: "name cannot be empty".to_string(),
                });
            }
        }

        if let Some(depth) = self.inference.as_ref().and_then(|i| i.max_depth) {
            validate_max_depth("inference.max_depth", depth)?;
        }

        if let Some(level) = self.log.as_ref().and_then(|l| l.level.as_deref()) {
            if !is_valid_log_level(level) {
                return Err(ConfigError::InvalidValue {
                    field: "log.level".to_string(),
                    reason: format!("unknown level '{}'", level),
                });
            }
        }

        Ok(())
    }

    /// Get the project name, if present
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    /// Get the configured inference depth, if present
    pub fn max_depth(&self) -> Option<usize> {
        self.inference.as_ref().and_then(|i| i.max_depth)
    }

    /// Get the configured log level, if present
    pub fn log_level(&self) -> Option<&str> {
        self.log.as_ref().and_then(|l| l.level.as_deref())
    }

    /// Merge another project config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &ProjectConfig) {
        if other.project.is_some() {
            self.project = other.project.clone();
        }
        if other.inference.is_some() {
            self.inference = other.inference.clone();
        }
        if other.brain.is_some() {
            self.brain = other.brain.clone();
        }
        if other.log.is_some() {
            self.log = other.log.clone();
        }
    }
}

/// Validate an inference depth value
pub(crate) fn validate_max_depth(field: &str, depth: usize) -> ConfigResult<()> {
    if depth == 0 || depth > MAX_DEPTH_LIMIT {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be between 1 and {}, got {}", MAX_DEPTH_LIMIT, depth),
        });
    }
    Ok(())
}

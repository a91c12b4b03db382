//! Global Configuration (~/.pyrite/config.toml)
//!
//! Handles user-level defaults stored in `~/.pyrite/config.toml`.

use crate::project::{validate_max_depth, BrainConfig, InferenceConfig, LogConfig};
use crate::{is_valid_log_level, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.pyrite/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default inference limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference: Option<InferenceConfig>,

    /// Default brain toggles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brain: Option<BrainConfig>,

    /// Default logging configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<LogConfig>,
}

impl GlobalConfig {
    /// Load global configuration from a file
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

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
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

    /// Get the global config file path (~/.pyrite/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".pyrite").join("config.toml"))
    }

    /// Get the default log level
    pub fn default_log_level(&self) -> Option<&str> {
        self.log.as_ref().and_then(|l| l.level.as_deref())
    }

    /// Merge another global config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &GlobalConfig) {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_global_config() {
        let toml = r#"
[log]
level = "info"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_log_level(), Some("info"));
    }

    #[test]
    fn test_parse_full_global_config() {
        let toml = r#"
[inference]
max_depth = 128

[brain]
functools = false

[log]
level = "trace"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.inference.unwrap().max_depth, Some(128));
    }

    #[test]
    fn test_project_section_not_allowed_globally() {
        let toml = r#"
[project]
name = "nope"
"#;
        assert!(toml::from_str::<GlobalConfig>(toml).is_err());
    }

    #[test]
    fn test_invalid_depth_value() {
        let config = GlobalConfig {
            inference: Some(InferenceConfig { max_depth: Some(0) }),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_configs() {
        let mut base = GlobalConfig::default();
        let override_config = GlobalConfig {
            log: Some(LogConfig {
                level: Some("error".to_string()),
            }),
            ..Default::default()
        };

        base.merge(&override_config);
        assert_eq!(base.default_log_level(), Some("error"));
    }
}

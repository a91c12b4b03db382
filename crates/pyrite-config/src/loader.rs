//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{validate_max_depth, BrainConfig, InferenceConfig, LogConfig, ProjectConfig};
use crate::{
    is_valid_log_level, ConfigError, ConfigResult, DEFAULT_LOG_LEVEL, DEFAULT_MAX_DEPTH,
};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "pyrite.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.pyrite/config.toml) - lowest priority
/// 2. Project config (./pyrite.toml) - overrides global
/// 3. Environment variables (PYRITE_*) - overrides project
/// 4. Caller overrides - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where pyrite.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config file instead of ~/.pyrite/config.toml
    pub fn with_global_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find pyrite.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;

        // Global config is optional and never fatal
        let global_config = self.load_global_config().unwrap_or_default();

        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config().unwrap_or_default();
        let project_config = self.apply_env_overrides(project_config)?;

        let project_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config) or error if the file is invalid
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.pyrite/config.toml
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GlobalConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides to project config
    ///
    /// Recognised variables:
    /// - PYRITE_MAX_DEPTH=<n>
    /// - PYRITE_LOG_LEVEL=<level>
    /// - PYRITE_BRAIN_FUNCTOOLS=true|false
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(depth) = env::var("PYRITE_MAX_DEPTH") {
            let depth: usize = depth.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "PYRITE_MAX_DEPTH".to_string(),
                reason: format!("'{}' is not a positive integer", depth),
            })?;
            validate_max_depth("PYRITE_MAX_DEPTH", depth)?;
            config
                .inference
                .get_or_insert_with(InferenceConfig::default)
                .max_depth = Some(depth);
        }

        if let Ok(level) = env::var("PYRITE_LOG_LEVEL") {
            if !is_valid_log_level(&level) {
                return Err(ConfigError::InvalidValue {
                    field: "PYRITE_LOG_LEVEL".to_string(),
                    reason: format!("unknown level '{}'", level),
                });
            }
            config.log.get_or_insert_with(LogConfig::default).level = Some(level);
        }

        if let Ok(functools) = env::var("PYRITE_BRAIN_FUNCTOOLS") {
            let enabled = matches!(functools.to_lowercase().as_str(), "true" | "1" | "yes");
            config
                .brain
                .get_or_insert_with(BrainConfig::default)
                .functools = Some(enabled);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Effective inference depth (project > global > default)
    pub fn max_depth(&self) -> usize {
        self.project
            .max_depth()
            .or_else(|| self.global.inference.as_ref().and_then(|i| i.max_depth))
            .unwrap_or(DEFAULT_MAX_DEPTH)
    }

    /// Effective log level (project > global > default)
    pub fn log_level(&self) -> &str {
        self.project
            .log_level()
            .or_else(|| self.global.default_log_level())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Whether the functools brain is enabled (on unless disabled)
    pub fn functools_enabled(&self) -> bool {
        self.brain_flag(|b| b.functools).unwrap_or(true)
    }

    /// Whether bare (uncalled) decorators are recognised
    pub fn bare_decorators(&self) -> bool {
        self.brain_flag(|b| b.bare_decorators).unwrap_or(false)
    }

    fn brain_flag(&self, pick: impl Fn(&BrainConfig) -> Option<bool>) -> Option<bool> {
        self.project
            .brain
            .as_ref()
            .and_then(&pick)
            .or_else(|| self.global.brain.as_ref().and_then(&pick))
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Get the project name
    pub fn project_name(&self) -> Option<&str> {
        self.project.project_name()
    }

    /// Check if this is a project (has pyrite.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

//! Engine settings derived from configuration

use pyrite_config::{Config, DEFAULT_LOG_LEVEL, DEFAULT_MAX_DEPTH};

/// Settings for a [`Manager`](crate::manager::Manager)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Maximum nesting of inference requests before giving up
    pub max_depth: usize,
    pub brains: BrainSettings,
    pub log: LogSettings,
}

/// Which brain plugins are registered, and how they match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainSettings {
    pub functools: bool,
    /// Accept `@lru_cache` written without a call
    pub bare_decorators: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            brains: BrainSettings::default(),
            log: LogSettings::default(),
        }
    }
}

impl Default for BrainSettings {
    fn default() -> Self {
        Self {
            functools: true,
            bare_decorators: false,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.max_depth(),
            brains: BrainSettings {
                functools: config.functools_enabled(),
                bare_decorators: config.bare_decorators(),
            },
            log: LogSettings {
                level: config.log_level().to_string(),
            },
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_bare_decorators(mut self, enabled: bool) -> Self {
        self.brains.bare_decorators = enabled;
        self
    }

    pub fn without_functools(mut self) -> Self {
        self.brains.functools = false;
        self
    }
}

//! Navigator configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed configuration document
    #[error("Invalid navigator config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value outside its allowed range
    #[error("Invalid navigator config value: {0}")]
    Invalid(String),
}

/// Where resolution of a path starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOrder {
    /// Deepest active container that can take the first step, falling back
    /// towards the root
    #[default]
    CurrentFirst,
    /// The root whenever it can take the first step
    RootFirst,
}

/// Navigator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Resolution start policy
    pub resolution: ResolutionOrder,
    /// Global animation switch, combined with each step's own flag
    pub animations: bool,
    /// Maximum number of queued requests (None for unbounded)
    pub max_pending: Option<usize>,
    /// Number of completed locations kept in history
    pub history_limit: usize,
    /// Default log filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            resolution: ResolutionOrder::CurrentFirst,
            animations: true,
            max_pending: None,
            history_limit: 32,
            log_filter: "info".to_string(),
        }
    }
}

impl NavigatorConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON, filling gaps with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pending == Some(0) {
            return Err(ConfigError::Invalid(
                "max_pending must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the resolution order
    pub fn resolution(mut self, order: ResolutionOrder) -> Self {
        self.resolution = order;
        self
    }

    /// Enable or disable animations
    pub fn animations(mut self, enabled: bool) -> Self {
        self.animations = enabled;
        self
    }

    /// Bound the number of queued requests
    pub fn max_pending(mut self, limit: Option<usize>) -> Self {
        self.max_pending = limit;
        self
    }

    /// Set the history length
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the default log filter
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

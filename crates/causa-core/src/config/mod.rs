//! Configuration: serde structs with compiled defaults, loadable from TOML.

pub mod defaults;
pub mod observability_config;
pub mod search_config;

use serde::{Deserialize, Serialize};

pub use observability_config::ObservabilityConfig;
pub use search_config::{
    depth_limit, validate_alpha, validate_depth, validate_path_length, validate_penalty,
    validate_threads, SearchConfig, SepsetStrategy,
};

use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CausaConfig {
    pub search: SearchConfig,
    pub observability: ObservabilityConfig,
}

impl CausaConfig {
    /// Load configuration from a TOML string. Missing fields take defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()
    }
}

//! Configuration loading.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML
//! file, then environment variables. The result is validated before it is
//! returned.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::env::apply_env_overrides;
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{key}={value:?} is not a valid port")]
    InvalidEnv { key: &'static str, value: String },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where configuration comes from, besides the environment.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Optional TOML file.
    pub config_path: Option<PathBuf>,
}

/// Parse a TOML document into a configuration. Missing keys take defaults.
pub fn parse_config(content: &str, path: &Path) -> Result<ProxyConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a TOML configuration file.
pub fn load_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

/// Build and validate the configuration from every layer.
pub fn load_config<F>(options: &LoadOptions, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &options.config_path {
        Some(path) => load_config_file(path)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

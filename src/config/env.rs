//! Environment variables and `.env` files.
//!
//! # Variables
//! - `OLLAMA_HOST` / `OLLAMA_PORT`: upstream host and port
//! - `OLLAMA_URL`: full upstream base URL, wins over host and port
//! - `PROXY_PORT`: listener port
//!
//! Empty values count as unset. Lookups go through a function so tests can
//! supply a map instead of touching the process environment.

use std::path::{Path, PathBuf};

use crate::config::loader::ConfigError;
use crate::config::schema::ProxyConfig;

pub const OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const OLLAMA_PORT: &str = "OLLAMA_PORT";
pub const OLLAMA_URL: &str = "OLLAMA_URL";
pub const PROXY_PORT: &str = "PROXY_PORT";

/// Read a variable from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Layer environment values over `config`.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(url) = get(OLLAMA_URL) {
        config.upstream.url = Some(url);
    }
    // Host and port are not read at all once a URL is configured.
    if config.upstream.url.is_none() {
        if let Some(host) = get(OLLAMA_HOST) {
            config.upstream.host = host;
        }
        if let Some(port) = get(OLLAMA_PORT) {
            config.upstream.port = parse_port(OLLAMA_PORT, &port)?;
        }
    }
    if let Some(port) = get(PROXY_PORT) {
        config.listener.port = parse_port(PROXY_PORT, &port)?;
    }

    Ok(())
}

fn parse_port(key: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

/// Outcome of loading a `.env` file. None of these is fatal.
#[derive(Debug)]
pub enum EnvFileStatus {
    Loaded(PathBuf),
    NotFound(PathBuf),
    Invalid { path: PathBuf, error: String },
}

impl EnvFileStatus {
    pub fn log(&self) {
        match self {
            EnvFileStatus::Loaded(path) => {
                tracing::info!(path = %path.display(), "Loaded environment file");
            }
            EnvFileStatus::NotFound(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "Environment file not found, using defaults"
                );
            }
            EnvFileStatus::Invalid { path, error } => {
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "Ignoring unreadable environment file"
                );
            }
        }
    }
}

/// Load `path` into the process environment. Variables already set in the
/// process are left untouched.
pub fn load_env_file(path: &Path) -> EnvFileStatus {
    match dotenvy::from_path(path) {
        Ok(()) => EnvFileStatus::Loaded(path.to_path_buf()),
        Err(e) if e.not_found() => EnvFileStatus::NotFound(path.to_path_buf()),
        Err(e) => EnvFileStatus::Invalid {
            path: path.to_path_buf(),
            error: e.to_string(),
        },
    }
}

//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file, and
//! every field has a default so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

use crate::config::validation::ValidationError;
use crate::proxy::UpstreamTarget;

pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 11435;
pub const DEFAULT_UPSTREAM_HOST: &str = "localhost";
pub const DEFAULT_UPSTREAM_PORT: u16 = 11434;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Where the proxy accepts connections.
    pub listener: ListenerConfig,

    /// Where requests are forwarded.
    pub upstream: UpstreamConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface address to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to bind. `PROXY_PORT` overrides it.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LISTEN_HOST.to_string(),
            port: DEFAULT_LISTEN_PORT,
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream hostname, used only when `url` is unset.
    pub host: String,

    /// Upstream port, used only when `url` is unset.
    pub port: u16,

    /// Full upstream base URL. Takes precedence over `host` and `port`.
    pub url: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_UPSTREAM_HOST.to_string(),
            port: DEFAULT_UPSTREAM_PORT,
            url: None,
        }
    }
}

impl UpstreamConfig {
    /// The base URL requests are forwarded to.
    pub fn effective_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}

impl ProxyConfig {
    /// Resolve the configured upstream into a forwarding target.
    pub fn upstream_target(&self) -> Result<UpstreamTarget, ValidationError> {
        Ok(UpstreamTarget::parse(&self.upstream.effective_url())?)
    }

    /// Socket address the listener binds.
    pub fn bind_address(&self) -> Result<SocketAddr, ValidationError> {
        let ip: IpAddr = self
            .listener
            .host
            .parse()
            .map_err(|_| ValidationError::InvalidBindHost(self.listener.host.clone()))?;
        Ok(SocketAddr::new(ip, self.listener.port))
    }
}

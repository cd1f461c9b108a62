//! Configuration validation.
//!
//! # Responsibilities
//! - Check the upstream resolves to a usable `http` target
//! - Check the listener address is a literal IP
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Runs before any socket is bound

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::proxy::UpstreamError;

/// A single semantic problem in a [`ProxyConfig`].
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("listener host {0:?} is not an IP address")]
    InvalidBindHost(String),
}

/// Validate a fully layered configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.upstream_target() {
        errors.push(e);
    }
    if let Err(e) = config.bind_address() {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

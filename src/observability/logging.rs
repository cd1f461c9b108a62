//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Build the default filter from the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub fn default_directives(level: &str) -> String {
    format!("ollama_cors_proxy={level},tower_http={level}")
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → .env file + process environment (env.rs)
//!     → validation.rs (semantic checks, all errors at once)
//!     → ProxyConfig (validated, immutable)
//!     → UpstreamTarget handed to the proxy handler
//! ```
//!
//! # Design Decisions
//! - Config is built once in `main`; request handling never reads the environment
//! - All fields have defaults to allow no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, LoadOptions};
pub use schema::{ListenerConfig, ProxyConfig, UpstreamConfig};
pub use validation::ValidationError;

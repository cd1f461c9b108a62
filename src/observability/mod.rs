//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! main
//!     → logging.rs (subscriber + filter, once at startup)
//!
//! Proxy handler:
//!     → access_log.rs (one line on arrival, one line on completion)
//! ```
//!
//! # Design Decisions
//! - Human-oriented fmt output on stdout
//! - `RUST_LOG` wins over the configured level
//! - Completion is logged when the relayed body is finished, not when
//!   response headers are produced

pub mod access_log;
pub mod logging;

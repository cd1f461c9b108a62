//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → meta.rs (summary for the access log)
//!     → upstream.rs (map URI onto the configured target)
//!     → headers.rs (Host/Origin rewrite, hop-by-hop removal)
//!     → handler.rs (hyper-util client, relay, 502 on failure)
//! ```
//!
//! # Design Decisions
//! - One fixed upstream, validated before the listener starts
//! - Bodies stream in both directions; nothing is buffered
//! - No retries: a failed exchange is reported to the caller once

pub mod handler;
pub mod headers;
pub mod meta;
pub mod upstream;

pub use handler::{ForwardError, ProxyHandler};
pub use meta::{RequestSummary, ResponseMeta};
pub use upstream::{UpstreamError, UpstreamTarget};

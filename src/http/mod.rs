//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route, tracing layer)
//!     → proxy::ProxyHandler (preflight or forward)
//!     → cors.rs (fixed CORS header set on every response)
//!     → Send to client
//! ```

pub mod cors;
pub mod server;

pub use server::HttpServer;

//! Ollama CORS Proxy Library
//!
//! A single-upstream reverse proxy that lets browser clients call a local
//! inference server by answering CORS preflights and stamping permissive
//! CORS headers on every response.

pub mod cli;
pub mod config;
pub mod http;
pub mod observability;
pub mod proxy;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use proxy::{ProxyHandler, UpstreamTarget};

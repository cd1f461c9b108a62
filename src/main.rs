//! Ollama CORS Proxy
//!
//! ```text
//!   Browser                 ┌──────────────────────────────┐
//!   ─────────── OPTIONS ───▶│  preflight: 200 + CORS       │
//!                           │                              │
//!   ─────────── GET/POST ──▶│  Host/Origin rewrite  ───────┼───▶ Ollama
//!   ◀── response + CORS ────│  streamed relay       ◀──────┼────
//!                           └──────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use ollama_cors_proxy::cli::Cli;
use ollama_cors_proxy::config::{self, env, LoadOptions};
use ollama_cors_proxy::observability::logging;
use ollama_cors_proxy::{HttpServer, ProxyHandler};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Loaded before the subscriber so RUST_LOG may come from the file.
    let env_file = env::load_env_file(&cli.env_file);

    logging::init(&cli.log_level);

    tracing::info!("ollama-cors-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    env_file.log();

    let options = LoadOptions {
        config_path: cli.config.clone(),
    };
    let config = config::load_config(&options, env::process_env).map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    let upstream = config.upstream_target()?;
    let bind_address = config.bind_address()?;

    tracing::info!(
        bind_address = %bind_address,
        upstream = %upstream,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(bind_address).await.map_err(|e| {
        tracing::error!(address = %bind_address, error = %e, "Failed to bind listener");
        e
    })?;

    tracing::info!(
        address = %listener.local_addr()?,
        upstream = %upstream,
        "CORS proxy listening"
    );

    let server = HttpServer::new(ProxyHandler::new(upstream));
    server.run(listener).await?;

    Ok(())
}

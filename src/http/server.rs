//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with a catch-all route
//! - Wire up middleware (request tracing)
//! - Serve connections from a bound listener
//! - Hand every request to the [`ProxyHandler`]

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::proxy::ProxyHandler;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: ProxyHandler,
}

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(handler: ProxyHandler) -> Self {
        let router = Self::build_router(AppState { handler });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    /// The router without a listener, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve connections until the process is terminated.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    // Absent when the router is driven without a socket, e.g. in tests.
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    state.handler.handle(request, remote_addr).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::cors::tests::assert_cors_headers;
    use crate::proxy::UpstreamTarget;
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let target = UpstreamTarget::parse("http://127.0.0.1:9").unwrap();
        HttpServer::new(ProxyHandler::new(target))
    }

    #[tokio::test]
    async fn test_preflight_on_any_path() {
        for path in ["/", "/api/tags", "/some/deeply/nested/path?x=1"] {
            let request = Request::builder()
                .method(Method::OPTIONS)
                .uri(path)
                .body(Body::empty())
                .unwrap();

            let response = server().router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "path {}", path);
            assert_cors_headers(response.headers());
        }
    }
}

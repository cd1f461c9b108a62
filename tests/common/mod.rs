//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::Path,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use ollama_cors_proxy::http::cors;
use ollama_cors_proxy::{HttpServer, ProxyHandler, UpstreamTarget};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// Body chunks served by the backend's `/stream` route.
pub const STREAM_CHUNKS: [&str; 3] = [
    "{\"response\":\"Hel\"}\n",
    "{\"response\":\"lo\"}\n",
    "{\"done\":true}\n",
];

/// Start a mock upstream on an ephemeral port.
///
/// - `/status/{code}` answers with that status and body `status {code}`
/// - `/stream` answers with [`STREAM_CHUNKS`], one chunk at a time
/// - `/cors` answers with its own CORS headers
/// - anything else echoes the request it received as JSON
pub async fn start_mock_backend() -> SocketAddr {
    let app = Router::new()
        .route("/status/{code}", any(status))
        .route("/stream", get(stream))
        .route("/cors", get(upstream_cors))
        .fallback(echo);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("status {}", code)).into_response()
}

async fn stream() -> Response {
    let chunks = futures_util::stream::unfold(0usize, |i| async move {
        if i >= STREAM_CHUNKS.len() {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        Some((Ok::<_, std::io::Error>(Bytes::from_static(STREAM_CHUNKS[i].as_bytes())), i + 1))
    });
    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(chunks))
        .unwrap()
}

async fn upstream_cors() -> Response {
    Response::builder()
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "http://upstream.example")
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET")
        .header("x-upstream", "yes")
        .body(Body::from("upstream"))
        .unwrap()
}

async fn echo(request: Request<Body>) -> Json<Value> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    Json(json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "host": header("host"),
        "origin": header("origin"),
        "x_forwarded_for": header("x-forwarded-for"),
        "authorization": header("authorization"),
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Start the proxy on an ephemeral port in front of `upstream`.
pub async fn start_proxy(upstream: &str) -> SocketAddr {
    let target = UpstreamTarget::parse(upstream).unwrap();
    let server = HttpServer::new(ProxyHandler::new(target));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

/// A loopback port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn assert_cors_headers(headers: &reqwest::header::HeaderMap) {
    for (name, value) in cors::cors_headers() {
        let sent: Vec<_> = headers.get_all(name.as_str()).iter().collect();
        assert_eq!(sent.len(), 1, "exactly one {} header", name);
        assert_eq!(sent[0], &value, "value of {}", name);
    }
}

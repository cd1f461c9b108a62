//! Per-request metadata captured for logging.

use axum::http::{header, Method, Request, StatusCode};
use std::net::SocketAddr;

/// What the access log records about an inbound request, taken before the
/// request is consumed by forwarding.
#[derive(Debug, Clone)]
pub struct RequestSummary {
    pub method: Method,
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub remote_addr: Option<SocketAddr>,
}

impl RequestSummary {
    pub fn from_request<B>(request: &Request<B>, remote_addr: Option<SocketAddr>) -> Self {
        let uri = request.uri();
        let host = request
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| uri.authority().map(|a| a.as_str()))
            .unwrap_or_default()
            .to_string();

        Self {
            method: request.method().clone(),
            // The listener only speaks plain HTTP.
            scheme: uri.scheme_str().unwrap_or("http").to_string(),
            host,
            path: uri.path().to_string(),
            remote_addr,
        }
    }

    pub fn remote_display(&self) -> String {
        self.remote_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Final status of one request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: StatusCode,
}

impl ResponseMeta {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }

    /// Human-readable reason phrase, empty for unregistered codes.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }
}

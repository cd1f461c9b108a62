//! The proxy handler: preflight short-circuit or forward-and-relay.
//!
//! # Request Flow
//! ```text
//! received
//!     ├─ OPTIONS  → 200 + CORS headers (no upstream call)
//!     └─ other    → rewrite URI/headers → upstream → stream response back
//!                                              └─ connect failure → 502
//! logged (arrival before dispatch, completion after the body is written)
//! ```

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, Version},
    response::Response,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

use crate::http::cors;
use crate::observability::access_log::{self, CompletionLog};
use crate::proxy::headers;
use crate::proxy::meta::{RequestSummary, ResponseMeta};
use crate::proxy::upstream::UpstreamTarget;

/// Failures while forwarding a single request. All map to `502 Bad Gateway`.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The rewritten upstream URI is not a valid URI.
    #[error("invalid upstream URI: {0}")]
    Uri(#[from] axum::http::uri::InvalidUri),

    /// Connecting to or exchanging headers with the upstream failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }
}

/// Forwards requests to one fixed upstream.
///
/// Cheap to clone; the target is shared and the client is a handle.
#[derive(Clone)]
pub struct ProxyHandler {
    target: Arc<UpstreamTarget>,
    client: Client<HttpConnector, Body>,
}

impl ProxyHandler {
    pub fn new(target: UpstreamTarget) -> Self {
        // No idle pooling: each inbound request gets its own upstream
        // connection, closed once the exchange finishes.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(HttpConnector::new());

        Self {
            target: Arc::new(target),
            client,
        }
    }

    /// Handle one inbound request. Never fails; upstream errors become 502.
    pub async fn handle(
        &self,
        request: Request<Body>,
        remote_addr: Option<SocketAddr>,
    ) -> Response {
        let summary = RequestSummary::from_request(&request, remote_addr);
        access_log::log_inbound(&summary);

        if request.method() == Method::OPTIONS {
            access_log::log_preflight(&summary);
            let response = cors::preflight_response();
            access_log::log_completed(&summary, &ResponseMeta::new(response.status()));
            return response;
        }

        let mut response = match self.forward(request, remote_addr).await {
            Ok((response, meta)) => {
                let (parts, body) = response.into_parts();
                let body = access_log::log_on_completion(body, CompletionLog::new(summary, meta));
                Response::from_parts(parts, body)
            }
            Err(e) => {
                tracing::error!(
                    method = %summary.method,
                    path = %summary.path,
                    upstream = %self.target,
                    error = %e,
                    "Upstream error"
                );
                let mut response = Response::new(Body::empty());
                *response.status_mut() = e.status();
                access_log::log_completed(&summary, &ResponseMeta::new(response.status()));
                response
            }
        };

        cors::apply_cors_headers(response.headers_mut());
        response
    }

    /// Send `request` upstream and return the relayed response with its
    /// captured status. The response body is still streaming when this
    /// returns.
    pub async fn forward(
        &self,
        request: Request<Body>,
        remote_addr: Option<SocketAddr>,
    ) -> Result<(Response, ResponseMeta), ForwardError> {
        let (mut parts, body) = request.into_parts();

        parts.uri = self.target.request_uri(&parts.uri)?;
        parts.version = Version::HTTP_11;
        parts.extensions.clear();
        headers::rewrite_request_headers(&mut parts.headers, &self.target, remote_addr);

        tracing::debug!(uri = %parts.uri, "Forwarding to upstream");

        let upstream_response = self.client.request(Request::from_parts(parts, body)).await?;
        Ok(relay_response(upstream_response))
    }
}

fn relay_response(response: axum::http::Response<Incoming>) -> (Response, ResponseMeta) {
    let (mut parts, body) = response.into_parts();
    headers::strip_hop_by_hop(&mut parts.headers);
    let meta = ResponseMeta::new(parts.status);
    (Response::from_parts(parts, Body::new(body)), meta)
}

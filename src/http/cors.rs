//! Static CORS headers.
//!
//! Every response leaving the proxy carries the same permissive header set,
//! so browser clients on any origin can reach the upstream. Preflight
//! requests are answered here without touching the upstream.

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_EXPOSE_HEADERS,
        },
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::Response,
};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS, PUT, DELETE";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization, Accept, Content-Length, \
Accept-Encoding, X-CSRF-Token, Origin, Cache-Control, X-Requested-With";
pub const EXPOSE_HEADERS: &str = "Content-Length, Content-Type";
pub const ALLOW_CREDENTIALS: &str = "true";

/// The full header set, in the order it is applied.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 5] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN)),
        (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS)),
        (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS)),
        (ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static(EXPOSE_HEADERS)),
        (ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static(ALLOW_CREDENTIALS)),
    ]
}

/// Set the CORS headers, replacing any values already present.
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    for (name, value) in cors_headers() {
        headers.insert(name, value);
    }
}

/// `200 OK` with an empty body and the CORS headers.
pub fn preflight_response() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    apply_cors_headers(response.headers_mut());
    response
}

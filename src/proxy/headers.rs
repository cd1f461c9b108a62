//! Header manipulation for the forwarding leg.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Point `Host` and `Origin` at the upstream
//! - Append the caller's address to `X-Forwarded-For`

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use std::net::SocketAddr;

use crate::proxy::upstream::UpstreamTarget;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Headers that only apply to a single transport connection (RFC 9110 §7.6.1).
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any header named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

/// Rewrite inbound request headers for dispatch to `target`.
///
/// The caller's `Host` and `Origin` are always replaced, even when the
/// caller sent none. `TE: trailers` survives the hop-by-hop strip.
pub fn rewrite_request_headers(
    headers: &mut HeaderMap,
    target: &UpstreamTarget,
    remote_addr: Option<SocketAddr>,
) {
    let wants_trailers = accepts_trailers(headers);
    strip_hop_by_hop(headers);
    if wants_trailers {
        headers.insert(header::TE, HeaderValue::from_static("trailers"));
    }

    headers.insert(header::HOST, target.host_header().clone());
    headers.insert(header::ORIGIN, target.origin_header().clone());

    if let Some(addr) = remote_addr {
        append_forwarded_for(headers, addr);
    }
}

fn accepts_trailers(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::TE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("trailers"))
}

fn append_forwarded_for(headers: &mut HeaderMap, addr: SocketAddr) {
    let client_ip = addr.ip().to_string();
    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        client_ip
    } else {
        format!("{}, {}", prior.join(", "), client_ip)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

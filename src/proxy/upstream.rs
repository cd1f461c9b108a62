//! The single upstream the proxy forwards to.
//!
//! # Responsibilities
//! - Parse and validate the configured upstream base URL once at startup
//! - Precompute the `Host` and `Origin` values sent upstream
//! - Map an inbound request URI onto the upstream (path join, query merge)
//!
//! # Design Decisions
//! - Only plain `http` upstreams are accepted; the outbound client has no TLS
//! - The target is immutable and shared behind an `Arc` by the handler

use axum::http::uri::InvalidUri;
use axum::http::{HeaderValue, Uri};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors raised while turning a configured URL into an [`UpstreamTarget`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The URL could not be parsed at all.
    #[error("invalid upstream URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The URL parsed but uses a scheme the forwarder cannot speak.
    #[error("unsupported upstream scheme {scheme:?} in {url:?} (expected \"http\")")]
    UnsupportedScheme { url: String, scheme: String },

    /// The URL has no host component.
    #[error("upstream URL {0:?} has no host")]
    MissingHost(String),

    /// The host cannot be carried in an HTTP header.
    #[error("upstream authority {0:?} is not a valid header value")]
    InvalidAuthority(String),
}

/// Validated upstream endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    url: Url,
    scheme: String,
    authority: String,
    base_path: String,
    base_query: Option<String>,
    host_header: HeaderValue,
    origin_header: HeaderValue,
}

impl UpstreamTarget {
    /// Parse an upstream base URL such as `http://localhost:11434`.
    pub fn parse(raw: &str) -> Result<Self, UpstreamError> {
        let url = Url::parse(raw).map_err(|source| UpstreamError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;

        if url.scheme() != "http" {
            return Err(UpstreamError::UnsupportedScheme {
                url: raw.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h,
            _ => return Err(UpstreamError::MissingHost(raw.to_string())),
        };

        // `Url::port` drops a port equal to the scheme default; keep it
        // when it was written out in the configured URL.
        let port = url
            .port()
            .or_else(|| written_port(raw).filter(|p| Some(*p) == url.port_or_known_default()));
        let authority = match port {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let scheme = url.scheme().to_string();

        let host_header = HeaderValue::from_str(&authority)
            .map_err(|_| UpstreamError::InvalidAuthority(authority.clone()))?;
        let origin_header = HeaderValue::from_str(&format!("{}://{}", scheme, authority))
            .map_err(|_| UpstreamError::InvalidAuthority(authority.clone()))?;

        Ok(Self {
            base_path: url.path().to_string(),
            base_query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
            url,
            scheme,
            authority,
            host_header,
            origin_header,
        })
    }

    /// `host[:port]` as sent in the `Host` header.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// `scheme://host[:port]`, the value sent in the `Origin` header.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }

    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    pub fn origin_header(&self) -> &HeaderValue {
        &self.origin_header
    }

    /// Build the absolute upstream URI for an inbound request URI.
    ///
    /// The upstream base path is joined to the request path with exactly one
    /// slash between them, and a base query is kept in front of the request
    /// query.
    pub fn request_uri(&self, original: &Uri) -> Result<Uri, InvalidUri> {
        let path = join_paths(&self.base_path, original.path());
        let mut target = format!("{}://{}{}", self.scheme, self.authority, path);

        match (self.base_query.as_deref(), original.query().filter(|q| !q.is_empty())) {
            (Some(base), Some(query)) => {
                target.push('?');
                target.push_str(base);
                target.push('&');
                target.push_str(query);
            }
            (Some(q), None) | (None, Some(q)) => {
                target.push('?');
                target.push_str(q);
            }
            (None, None) => {}
        }

        target.parse()
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// The port as written in `raw`, if any.
fn written_port(raw: &str) -> Option<u16> {
    let (_, rest) = raw.split_once("://")?;
    let authority = rest.split(&['/', '?', '#'][..]).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let (host, port) = host_port.rsplit_once(':')?;
    // a bare IPv6 literal such as `[::1]`
    if host.starts_with('[') && !host.ends_with(']') {
        return None;
    }
    port.parse().ok()
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_host_and_port() {
        let target = UpstreamTarget::parse("http://localhost:11434").unwrap();
        assert_eq!(target.authority(), "localhost:11434");
        assert_eq!(target.scheme(), "http");
        assert_eq!(target.origin(), "http://localhost:11434");
        assert_eq!(target.host_header(), "localhost:11434");
        assert_eq!(target.origin_header(), "http://localhost:11434");
    }

    #[test]
    fn test_default_port_is_omitted_from_authority() {
        let target = UpstreamTarget::parse("http://example.internal").unwrap();
        assert_eq!(target.authority(), "example.internal");
        assert_eq!(target.origin(), "http://example.internal");
    }

    #[test]
    fn test_written_default_port_is_kept() {
        let target = UpstreamTarget::parse("http://example.internal:80").unwrap();
        assert_eq!(target.authority(), "example.internal:80");
        assert_eq!(target.host_header(), "example.internal:80");
        assert_eq!(target.origin_header(), "http://example.internal:80");

        let v6 = UpstreamTarget::parse("http://[::1]").unwrap();
        assert_eq!(v6.authority(), "[::1]");
        let v6_port = UpstreamTarget::parse("http://[::1]:80/").unwrap();
        assert_eq!(v6_port.authority(), "[::1]:80");
    }

    #[test]
    fn test_rejects_garbage() {
        let err = UpstreamTarget::parse("not a url").unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidUrl { .. }));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = UpstreamTarget::parse("ftp://localhost:21").unwrap_err();
        assert!(matches!(err, UpstreamError::UnsupportedScheme { .. }));

        // "host:port" without a scheme parses with the host as the scheme
        let err = UpstreamTarget::parse("localhost:11434").unwrap_err();
        assert!(matches!(err, UpstreamError::UnsupportedScheme { .. }));
    }

    #[test]
    fn test_request_uri_keeps_path_and_query() {
        let target = UpstreamTarget::parse("http://localhost:11434").unwrap();
        let mapped = target.request_uri(&uri("/api/tags?verbose=true")).unwrap();
        assert_eq!(mapped.to_string(), "http://localhost:11434/api/tags?verbose=true");

        let root = target.request_uri(&uri("/")).unwrap();
        assert_eq!(root.to_string(), "http://localhost:11434/");
    }

    #[test]
    fn test_request_uri_joins_base_path() {
        let target = UpstreamTarget::parse("http://example.internal:9000/ollama").unwrap();
        let mapped = target.request_uri(&uri("/api/generate")).unwrap();
        assert_eq!(mapped.to_string(), "http://example.internal:9000/ollama/api/generate");

        let slashed = UpstreamTarget::parse("http://example.internal:9000/ollama/").unwrap();
        let mapped = slashed.request_uri(&uri("/api/generate")).unwrap();
        assert_eq!(mapped.to_string(), "http://example.internal:9000/ollama/api/generate");
    }

    #[test]
    fn test_request_uri_merges_queries() {
        let target = UpstreamTarget::parse("http://localhost:11434/?key=abc").unwrap();
        let both = target.request_uri(&uri("/api/tags?x=1")).unwrap();
        assert_eq!(both.query(), Some("key=abc&x=1"));

        let base_only = target.request_uri(&uri("/api/tags")).unwrap();
        assert_eq!(base_only.query(), Some("key=abc"));
    }
}

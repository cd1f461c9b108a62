//! Access log lines for proxied requests.
//!
//! Each request produces an arrival line before dispatch and a completion
//! line once the response has been written out. For forwarded requests the
//! completion line is emitted by [`CompletionLog`], which travels inside the
//! relayed body stream and fires when that stream is dropped.

use axum::body::Body;
use futures_util::StreamExt;

use crate::proxy::meta::{RequestSummary, ResponseMeta};

pub fn log_inbound(summary: &RequestSummary) {
    tracing::info!(
        method = %summary.method,
        scheme = %summary.scheme,
        host = %summary.host,
        path = %summary.path,
        remote_addr = %summary.remote_display(),
        "Incoming request"
    );
}

pub fn log_preflight(summary: &RequestSummary) {
    tracing::debug!(path = %summary.path, "CORS preflight request");
}

pub fn log_completed(summary: &RequestSummary, meta: &ResponseMeta) {
    tracing::info!(
        status = meta.status.as_u16(),
        status_text = meta.status_text(),
        method = %summary.method,
        path = %summary.path,
        "Response sent"
    );
}

/// Logs the completion line when dropped.
///
/// Dropping happens after the last body chunk has been written, or earlier
/// if the caller disconnects or the upstream stream fails.
#[derive(Debug)]
pub struct CompletionLog {
    summary: RequestSummary,
    meta: ResponseMeta,
    bytes_sent: u64,
    failed: bool,
}

impl CompletionLog {
    pub fn new(summary: RequestSummary, meta: ResponseMeta) -> Self {
        Self {
            summary,
            meta,
            bytes_sent: 0,
            failed: false,
        }
    }

    fn record_chunk(&mut self, len: usize) {
        self.bytes_sent += len as u64;
    }

    fn record_error(&mut self, error: &axum::Error) {
        self.failed = true;
        tracing::warn!(
            method = %self.summary.method,
            path = %self.summary.path,
            error = %error,
            "Upstream body failed mid-transfer"
        );
    }
}

impl Drop for CompletionLog {
    fn drop(&mut self) {
        if self.failed {
            tracing::warn!(
                status = self.meta.status.as_u16(),
                status_text = self.meta.status_text(),
                method = %self.summary.method,
                path = %self.summary.path,
                bytes_sent = self.bytes_sent,
                "Response aborted"
            );
        } else {
            log_completed(&self.summary, &self.meta);
        }
    }
}

/// Wrap a response body so `guard` lives exactly as long as the body stream.
pub fn log_on_completion(body: Body, mut guard: CompletionLog) -> Body {
    let stream = body.into_data_stream().map(move |chunk| {
        match &chunk {
            Ok(bytes) => guard.record_chunk(bytes.len()),
            Err(e) => guard.record_error(e),
        }
        chunk
    });
    Body::from_stream(stream)
}

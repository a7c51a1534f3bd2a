//! HTTP Interceptor interfaces
//!
//! Interceptors observe requests before they are sent, responses once they
//! arrive, and errors when the transport fails. The hooks are best-effort and
//! should avoid expensive work.

use std::sync::atomic::{AtomicU64, Ordering};

use super::response::ApiResponse;
use super::transport::{HttpMethod, HttpTransportRequest};
use crate::error::MistyError;

/// Context passed to interceptors describing the request.
#[derive(Clone, Debug)]
pub struct HttpRequestContext {
    pub request_id: u64,
    pub method: HttpMethod,
    pub url: String,
    /// The body is kept as raw bytes (asset fetch).
    pub binary: bool,
}

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing request id.
pub fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// HTTP interceptor trait
pub trait HttpInterceptor: Send + Sync {
    /// Called before sending a request. Returning an error short-circuits it.
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        _request: &HttpTransportRequest,
    ) -> Result<(), MistyError> {
        Ok(())
    }

    /// Called after a response is received, whatever its status.
    fn on_response(&self, _ctx: &HttpRequestContext, _response: &ApiResponse) {}

    /// Called when the request failed before producing a response.
    fn on_error(&self, _ctx: &HttpRequestContext, _error: &MistyError) {}
}

/// Trace line per request, backed by `tracing`.
#[derive(Clone, Debug, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(
        &self,
        ctx: &HttpRequestContext,
        _request: &HttpTransportRequest,
    ) -> Result<(), MistyError> {
        tracing::info!(target: "misty_client::http", request_id = ctx.request_id, "{} {}", ctx.method, ctx.url);
        Ok(())
    }

    fn on_response(&self, ctx: &HttpRequestContext, response: &ApiResponse) {
        tracing::debug!(target: "misty_client::http", request_id = ctx.request_id, url = %ctx.url, status = response.status(), "response received");
    }

    fn on_error(&self, ctx: &HttpRequestContext, error: &MistyError) {
        tracing::warn!(target: "misty_client::http", request_id = ctx.request_id, url = %ctx.url, err = %error, "request error");
    }
}

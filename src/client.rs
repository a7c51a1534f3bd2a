//! Misty client
//!
//! [`MistyClient`] owns an immutable [`ClientConfig`], a transport and a list
//! of interceptors. It exposes the raw GET/POST/DELETE pass-throughs and hands
//! out the capability handles ([`AssetStore`], [`RecordingController`]) that
//! implement the acquisition workflow on top of them.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

use crate::assets::{AssetKind, AssetStore};
use crate::config::ClientConfig;
use crate::defaults;
use crate::error::MistyError;
use crate::http::interceptor::next_request_id;
use crate::http::{
    ApiResponse, HttpInterceptor, HttpMethod, HttpRequestContext, HttpTransport,
    HttpTransportRequest, LoggingInterceptor, Params, ReqwestTransport,
};
use crate::recording::RecordingController;

/// Client for one device.
#[derive(Clone)]
pub struct MistyClient {
    config: Arc<ClientConfig>,
    headers: HeaderMap,
    transport: Arc<dyn HttpTransport>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
}

impl std::fmt::Debug for MistyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistyClient")
            .field("base_url", &self.config.base_url())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl MistyClient {
    /// Client for `base_url` with default HTTP settings.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, MistyError> {
        Self::with_config(ClientConfig::new(base_url)?)
    }

    /// Client using the `reqwest` transport built from `config.http`.
    pub fn with_config(config: ClientConfig) -> Result<Self, MistyError> {
        let transport = ReqwestTransport::new(&config.http)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Client using a caller-provided transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, MistyError> {
        let headers = build_headers(&config)?;
        Ok(Self {
            config: Arc::new(config),
            headers,
            transport,
            interceptors: vec![Arc::new(LoggingInterceptor)],
        })
    }

    /// Add an interceptor after the default logging one.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Asset operations for one asset family.
    pub fn assets(&self, kind: AssetKind) -> AssetStore {
        AssetStore::new(self.clone(), kind)
    }

    /// Audio asset operations.
    pub fn audio(&self) -> AssetStore {
        self.assets(AssetKind::Audio)
    }

    /// Voice capture operations.
    pub fn recording(&self) -> RecordingController {
        RecordingController::new(self.clone())
    }

    /// GET with optional query parameters; body decoded as JSON or text.
    pub async fn get(
        &self,
        endpoint: &str,
        params: Option<&Params>,
    ) -> Result<ApiResponse, MistyError> {
        self.send(HttpMethod::Get, endpoint, params).await
    }

    /// POST with an optional JSON body; body decoded as JSON or text.
    pub async fn post(
        &self,
        endpoint: &str,
        body: Option<&Params>,
    ) -> Result<ApiResponse, MistyError> {
        self.send(HttpMethod::Post, endpoint, body).await
    }

    /// DELETE with optional query parameters; body decoded as JSON or text.
    pub async fn delete(
        &self,
        endpoint: &str,
        params: Option<&Params>,
    ) -> Result<ApiResponse, MistyError> {
        self.send(HttpMethod::Delete, endpoint, params).await
    }

    /// Send a request and decode the body as JSON, falling back to text.
    ///
    /// Any HTTP status is returned as a response; only transport failures are
    /// errors here.
    pub async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Option<&Params>,
    ) -> Result<ApiResponse, MistyError> {
        self.execute(method, endpoint, params, false).await
    }

    /// GET whose body is kept as raw bytes.
    pub async fn get_binary(
        &self,
        endpoint: &str,
        params: Option<&Params>,
    ) -> Result<ApiResponse, MistyError> {
        self.execute(HttpMethod::Get, endpoint, params, true).await
    }

    async fn execute(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Option<&Params>,
        binary: bool,
    ) -> Result<ApiResponse, MistyError> {
        let url = self.config.url_for(endpoint);
        let ctx = HttpRequestContext {
            request_id: next_request_id(),
            method,
            url: url.clone(),
            binary,
        };

        let (query, body) = match method {
            HttpMethod::Post => (Vec::new(), params.map(Params::to_json)),
            HttpMethod::Get | HttpMethod::Delete => (
                params.map(Params::to_query_pairs).unwrap_or_default(),
                None,
            ),
        };
        let request = HttpTransportRequest {
            method,
            url,
            headers: self.headers.clone(),
            query,
            body,
        };

        for interceptor in &self.interceptors {
            if let Err(e) = interceptor.on_before_send(&ctx, &request) {
                self.notify_error(&ctx, &e);
                return Err(e);
            }
        }

        let raw = match self.transport.execute(request).await {
            Ok(raw) => raw,
            Err(e) => {
                self.notify_error(&ctx, &e);
                return Err(e);
            }
        };

        let response = if binary {
            ApiResponse::binary(raw.status, raw.headers, raw.body)
        } else {
            ApiResponse::decoded(raw.status, raw.headers, &raw.body)
        };
        for interceptor in &self.interceptors {
            interceptor.on_response(&ctx, &response);
        }
        Ok(response)
    }

    fn notify_error(&self, ctx: &HttpRequestContext, error: &MistyError) {
        for interceptor in &self.interceptors {
            interceptor.on_error(ctx, error);
        }
    }
}

fn build_headers(config: &ClientConfig) -> Result<HeaderMap, MistyError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(defaults::http::CONTENT_TYPE),
    );
    for (key, value) in &config.http.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| MistyError::InvalidInput(format!("invalid header name {key:?}: {e}")))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            MistyError::InvalidInput(format!("invalid value for header {key:?}: {e}"))
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

//! HTTP transport abstraction.
//!
//! The client never talks to `reqwest` directly; it hands a fully resolved
//! [`HttpTransportRequest`] to an [`HttpTransport`]. The default
//! [`ReqwestTransport`] performs the real request, tests can inject their own.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::HttpConfig;
use crate::error::MistyError;

/// Methods the device API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level request data.
#[derive(Debug, Clone)]
pub struct HttpTransportRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    /// Query pairs (GET/DELETE).
    pub query: Vec<(String, String)>,
    /// JSON body (POST); `None` sends no body at all.
    pub body: Option<Value>,
}

/// Transport-level response data.
#[derive(Debug, Clone)]
pub struct HttpTransportResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// Executes one request. Network faults must come back as
/// [`MistyError::Transport`]; any HTTP status is a successful transport result.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, MistyError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a `reqwest::Client` from the HTTP settings.
    pub fn new(http: &HttpConfig) -> Result<Self, MistyError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = http.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = http.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(user_agent) = &http.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let http_client = builder
            .build()
            .map_err(|e| MistyError::InvalidInput(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http_client })
    }

    /// Reuse an existing `reqwest::Client`.
    pub const fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, MistyError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http_client.get(&request.url),
            HttpMethod::Post => self.http_client.post(&request.url),
            HttpMethod::Delete => self.http_client.delete(&request.url),
        }
        .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| MistyError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let headers = header_map_to_strings(resp.headers());
        let body = resp
            .bytes()
            .await
            .map_err(|e| MistyError::Transport(format!("failed to read response body: {e}")))?;

        Ok(HttpTransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

/// Flatten a header map into lowercased name → value strings.
pub fn header_map_to_strings(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

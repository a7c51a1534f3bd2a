//! Client configuration types.
//!
//! [`ClientConfig`] holds everything a [`crate::MistyClient`] needs for its
//! whole lifetime: the device base address and the HTTP settings. It is built
//! once and never mutated afterwards; every client owns its own copy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::MistyError;

/// HTTP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout (unset by default: requests may block indefinitely)
    #[serde(with = "duration_option_serde")]
    pub timeout: Option<Duration>,
    /// Connection timeout
    #[serde(with = "duration_option_serde")]
    pub connect_timeout: Option<Duration>,
    /// Extra headers sent on every request
    pub headers: HashMap<String, String>,
    /// User agent
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            headers: HashMap::new(),
            user_agent: Some(crate::defaults::http::USER_AGENT.to_string()),
        }
    }
}

impl HttpConfig {
    /// Returns a builder for constructing `HttpConfig`
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::new()
    }
}

/// Builder for `HttpConfig`
#[derive(Debug, Clone, Default)]
pub struct HttpConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    headers: HashMap<String, String>,
    user_agent: Option<String>,
}

impl HttpConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
    pub fn user_agent<S: Into<String>>(mut self, user_agent: Option<S>) -> Self {
        self.user_agent = user_agent.map(|s| s.into());
        self
    }
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Build the configuration
    pub fn build(self) -> HttpConfig {
        HttpConfig {
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            headers: self.headers,
            user_agent: self
                .user_agent
                .or_else(|| HttpConfig::default().user_agent),
        }
    }
}

/// Configuration of one client instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    base_url: String,
    pub http: HttpConfig,
}

impl ClientConfig {
    /// Create a config for the device at `base_url`.
    ///
    /// Trailing slashes are trimmed so endpoint joins yield a single `/`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, MistyError> {
        let trimmed = crate::http::url::trim_base_url(base_url.as_ref());
        if trimmed.is_empty() {
            return Err(MistyError::InvalidInput(
                "base URL cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            http: HttpConfig::default(),
        })
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.http.headers.insert(key.into(), value.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path.
    pub fn url_for(&self, endpoint: &str) -> String {
        crate::http::url::join_url(&self.base_url, endpoint)
    }
}

// Helper module for Duration serialization
mod duration_option_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => (d.as_millis() as u64).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: Option<u64> = Option::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

//! HTTP configuration types.
//!
//! This module defines `HttpConfig` and its builder, used to configure the
//! underlying `reqwest` client and the chunked-transfer behavior of
//! [`ApiClient`](crate::client::ApiClient).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Which HTTP protocol versions the client may negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersionPolicy {
    /// HTTP/1.1, or HTTP/2 when offered through ALPN.
    #[default]
    Auto,
    /// HTTP/1.1 only. Required for `Transfer-Encoding: chunked`.
    Http1Only,
    /// HTTP/2 without negotiation.
    Http2PriorKnowledge,
}

/// HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout
    #[serde(with = "duration_option_serde")]
    pub timeout: Option<Duration>,
    /// Connection timeout
    #[serde(with = "duration_option_serde")]
    pub connect_timeout: Option<Duration>,
    /// Custom headers sent with every request
    pub headers: HashMap<String, String>,
    /// Proxy settings
    pub proxy: Option<String>,
    /// User agent
    pub user_agent: Option<String>,
    /// Protocol policy; read through [`HttpConfig::http_version`].
    http_version: HttpVersionPolicy,
    /// Force chunked transfer encoding for multipart bodies.
    chunked_transfer: bool,
}

/// Builder for `HttpConfig` to construct configuration in a unified and safe way
#[derive(Debug, Clone, Default)]
pub struct HttpConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    headers: HashMap<String, String>,
    proxy: Option<String>,
    user_agent: Option<String>,
    http_version: Option<HttpVersionPolicy>,
    chunked_transfer: Option<bool>,
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
    pub fn proxy<S: Into<String>>(mut self, proxy: Option<S>) -> Self {
        self.proxy = proxy.map(|s| s.into());
        self
    }
    /// Header names are stored lowercased, so names differing only in case
    /// collapse to the last value set.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v)),
        );
        self
    }
    pub fn http_version(mut self, policy: HttpVersionPolicy) -> Self {
        self.http_version = Some(policy);
        self
    }
    /// Force chunked transfer encoding for multipart bodies. Enabling this
    /// overrides any protocol policy other than [`HttpVersionPolicy::Http1Only`].
    /// Left unset, the environment default applies.
    pub fn chunked_transfer(mut self, enabled: bool) -> Self {
        self.chunked_transfer = Some(enabled);
        self
    }

    /// Build the configuration
    pub fn build(self) -> HttpConfig {
        let mut config = HttpConfig {
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            headers: self.headers,
            proxy: self.proxy,
            user_agent: self.user_agent,
            http_version: self.http_version.unwrap_or_default(),
            chunked_transfer: false,
        };
        if self
            .chunked_transfer
            .unwrap_or_else(chunked_transfer_from_env)
        {
            config.enable_chunked_transfer();
        }
        config
    }
}

impl HttpConfig {
    /// Returns a builder for constructing `HttpConfig`
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::new()
    }

    /// Force chunked transfer encoding for multipart bodies.
    ///
    /// The protocol policy is pinned to HTTP/1.1 in the same step. Calling
    /// this more than once has no further effect.
    pub fn enable_chunked_transfer(&mut self) -> &mut Self {
        if self.http_version != HttpVersionPolicy::Http1Only {
            if self.http_version == HttpVersionPolicy::Http2PriorKnowledge {
                tracing::warn!(
                    target: "chunked_upload::http",
                    "chunked transfer requires HTTP/1.1, dropping HTTP/2 prior knowledge"
                );
            }
            self.http_version = HttpVersionPolicy::Http1Only;
        }
        self.chunked_transfer = true;
        self
    }

    pub fn is_chunked_transfer_enabled(&self) -> bool {
        self.chunked_transfer
    }

    /// Effective protocol policy. Always `Http1Only` while chunked transfer
    /// is enabled, including for configurations loaded through serde.
    pub fn http_version(&self) -> HttpVersionPolicy {
        if self.chunked_transfer {
            HttpVersionPolicy::Http1Only
        } else {
            self.http_version
        }
    }

    /// Change the protocol policy. Ignored with a warning while chunked
    /// transfer is enabled and the policy is not `Http1Only`.
    pub fn set_http_version(&mut self, policy: HttpVersionPolicy) -> &mut Self {
        if self.chunked_transfer && policy != HttpVersionPolicy::Http1Only {
            tracing::warn!(
                target: "chunked_upload::http",
                requested = ?policy,
                "ignoring protocol policy while chunked transfer is enabled"
            );
            return self;
        }
        self.http_version = policy;
        self
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
            Some(d) => d.as_secs().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

fn chunked_transfer_from_env() -> bool {
    std::env::var(crate::defaults::env::TRANSFER_CHUNKED)
        .map(|val| parse_flag(&val))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

impl Default for HttpConfig {
    fn default() -> Self {
        let mut config = Self {
            timeout: Some(crate::defaults::http::REQUEST_TIMEOUT),
            connect_timeout: Some(crate::defaults::http::CONNECT_TIMEOUT),
            headers: HashMap::new(),
            proxy: None,
            user_agent: Some(crate::defaults::http::USER_AGENT.to_string()),
            http_version: HttpVersionPolicy::Auto,
            chunked_transfer: false,
        };
        if chunked_transfer_from_env() {
            config.enable_chunked_transfer();
        }
        config
    }
}

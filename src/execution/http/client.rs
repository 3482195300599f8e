//! HTTP client builder utilities
//!
//! Unified `reqwest::Client` construction from [`HttpConfig`].

use crate::error::ClientError;
use crate::types::{HttpConfig, HttpVersionPolicy};

/// Build an HTTP client from HttpConfig
///
/// Applies timeouts, proxy, user agent and the protocol policy. With
/// chunked transfer enabled the client is restricted to HTTP/1.1, so it can
/// never negotiate HTTP/2 through ALPN.
///
/// Default headers are not installed on the client; `ApiClient` applies them
/// per request so that custom transports see them too.
///
/// # Example
/// ```rust,no_run
/// use chunked_upload::types::HttpConfig;
/// use chunked_upload::execution::http::client::build_http_client_from_config;
///
/// let config = HttpConfig::default();
/// let client = build_http_client_from_config(&config)?;
/// # Ok::<(), chunked_upload::ClientError>(())
/// ```
pub fn build_http_client_from_config(config: &HttpConfig) -> Result<reqwest::Client, ClientError> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| ClientError::ConfigurationError(format!("Invalid proxy URL: {e}")))?;
        builder = builder.proxy(proxy);
    }

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    match config.http_version() {
        HttpVersionPolicy::Auto => {}
        HttpVersionPolicy::Http1Only => builder = builder.http1_only(),
        HttpVersionPolicy::Http2PriorKnowledge => builder = builder.http2_prior_knowledge(),
    }

    builder
        .build()
        .map_err(|e| ClientError::ConfigurationError(format!("Failed to create HTTP client: {e}")))
}

//! API client
//!
//! [`ApiClient`] binds a base URL, default headers and an [`HttpConfig`] to a
//! `reqwest` client and an interceptor chain. Every request built through it
//! goes through the chain before reaching the transport.
//!
//! # Example
//! ```rust,no_run
//! use chunked_upload::{ApiClient, UploadForm};
//!
//! # async fn run() -> Result<(), chunked_upload::ClientError> {
//! let client = ApiClient::new("https://files.example.com/v1")?.enable_chunked_transfer()?;
//! let form = UploadForm::new().file("file", "backup.tar").await?;
//! let response = client.upload("/uploads", form).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, RequestBuilder, Response, Version};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::execution::http::chunked::ForceChunkedMultipartInterceptor;
use crate::execution::http::client::build_http_client_from_config;
use crate::execution::http::headers::HttpHeaderBuilder;
use crate::execution::http::interceptor::{HttpInterceptor, InterceptorChain, LoggingInterceptor};
use crate::execution::http::transport::HttpTransport;
use crate::execution::upload::UploadForm;
use crate::types::{HttpConfig, HttpVersionPolicy};

/// Buffered response of [`ApiClient::invoke`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    async fn read(response: Response) -> Result<Self, ClientError> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    fn into_error(self) -> ClientError {
        let details = serde_json::from_slice::<serde_json::Value>(&self.body).ok();
        let message = if self.body.is_empty() {
            reqwest::StatusCode::from_u16(self.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown status")
                .to_string()
        } else {
            self.text()
        };
        ClientError::ApiError {
            code: self.status,
            message,
            details,
        }
    }
}

/// HTTP API client.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    config: HttpConfig,
    default_headers: HeaderMap,
    http_client: reqwest::Client,
    transport: Option<Arc<dyn HttpTransport>>,
    interceptors: InterceptorChain,
}

impl ApiClient {
    /// Client for `base_url` with the default configuration.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().with_base_url(base_url).build()
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Send multipart bodies with `Transfer-Encoding: chunked` instead of a
    /// precomputed `Content-Length`.
    ///
    /// Pins the client to HTTP/1.1 and installs
    /// [`ForceChunkedMultipartInterceptor`]. When the interceptor is already
    /// installed the client is returned unchanged, so calling this repeatedly
    /// never duplicates it. Requests already sent are not affected.
    ///
    /// Fails only if the underlying `reqwest` client cannot be rebuilt.
    pub fn enable_chunked_transfer(mut self) -> Result<Self, ClientError> {
        if self
            .interceptors
            .contains(ForceChunkedMultipartInterceptor::ID)
        {
            tracing::debug!(target: "chunked_upload::http", base_url = %self.base_url, "chunked transfer already enabled");
            return Ok(self);
        }

        let mut config = self.config.clone();
        config.enable_chunked_transfer();
        self.http_client = build_http_client_from_config(&config)?;
        self.config = config;
        self.interceptors
            .push(Arc::new(ForceChunkedMultipartInterceptor::new()));

        tracing::debug!(target: "chunked_upload::http", base_url = %self.base_url, "chunked transfer enabled");
        Ok(self)
    }

    pub fn is_chunked_transfer_enabled(&self) -> bool {
        self.config.is_chunked_transfer_enabled()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Join `path` onto the base URL with exactly one `/` between them.
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request against `path` with the default headers applied and
    /// the request version matching the protocol policy.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, self.url(path))
            .headers(self.default_headers.clone());
        match self.config.http_version() {
            HttpVersionPolicy::Auto => builder,
            HttpVersionPolicy::Http1Only => builder.version(Version::HTTP_11),
            HttpVersionPolicy::Http2PriorKnowledge => builder.version(Version::HTTP_2),
        }
    }

    /// Send `request` through the interceptor chain and return the raw
    /// response, whatever its status.
    pub async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let transport: &dyn HttpTransport = match &self.transport {
            Some(transport) => transport.as_ref(),
            None => &self.http_client,
        };
        self.interceptors.run(request, transport).await
    }

    /// Send `request` and buffer the response. Non-2xx statuses become
    /// [`ClientError::ApiError`].
    pub async fn invoke(&self, request: Request) -> Result<ApiResponse, ClientError> {
        let response = ApiResponse::read(self.execute(request).await?).await?;
        if !response.is_success() {
            let error = response.into_error();
            tracing::debug!(target: "chunked_upload::http", err = %error, "request failed");
            return Err(error);
        }
        Ok(response)
    }

    /// POST `form` to `path` as `multipart/form-data`.
    pub async fn upload(&self, path: &str, form: UploadForm) -> Result<ApiResponse, ClientError> {
        let request = self
            .request(Method::POST, path)
            .multipart(form.into_form())
            .build()?;
        tracing::debug!(
            target: "chunked_upload::http",
            url = %request.url(),
            chunked = self.is_chunked_transfer_enabled(),
            "uploading multipart form"
        );
        self.invoke(request).await
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("http_version", &self.config.http_version())
            .field("chunked_transfer", &self.config.is_chunked_transfer_enabled())
            .field("default_headers_len", &self.default_headers.len())
            .field("has_custom_transport", &self.transport.is_some())
            .field("interceptors", &self.interceptors)
            .finish()
    }
}

/// Builder for [`ApiClient`].
#[derive(Clone, Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    http_config: HttpConfig,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
    transport: Option<Arc<dyn HttpTransport>>,
    http_debug: bool,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Replace the whole HTTP configuration.
    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.connect_timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http_config.user_agent = Some(user_agent.into());
        self
    }

    /// Add a default header. Names are case-insensitive; the last value set
    /// for a name wins.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_config
            .headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.http_config.proxy = Some(proxy_url.into());
        self
    }

    pub fn with_http_version(mut self, policy: HttpVersionPolicy) -> Self {
        self.http_config.set_http_version(policy);
        self
    }

    /// Force chunked transfer for multipart bodies (see
    /// [`ApiClient::enable_chunked_transfer`]).
    pub fn with_chunked_transfer(mut self) -> Self {
        self.http_config.enable_chunked_transfer();
        self
    }

    /// Append an interceptor. Interceptors run in insertion order; one whose
    /// id is already present is skipped.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Replace `reqwest` as the last stage of the chain.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Install a [`LoggingInterceptor`] in front of the chain.
    pub fn http_debug(mut self, enabled: bool) -> Self {
        self.http_debug = enabled;
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::ConfigurationError("Base URL is required".to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| {
            ClientError::ConfigurationError(format!("Invalid base URL '{base_url}': {e}"))
        })?;

        let mut config = self.http_config;
        let mut interceptors = InterceptorChain::new();
        if self.http_debug {
            interceptors.push(Arc::new(LoggingInterceptor));
        }
        for interceptor in self.interceptors {
            let id = interceptor.id();
            if !interceptors.push(interceptor) {
                tracing::warn!(target: "chunked_upload::http", id, "duplicate interceptor skipped");
            }
        }
        // The interceptor and the HTTP/1.1 pin always go together.
        if interceptors.contains(ForceChunkedMultipartInterceptor::ID) {
            config.enable_chunked_transfer();
        }
        if config.is_chunked_transfer_enabled() {
            interceptors.push(Arc::new(ForceChunkedMultipartInterceptor::new()));
        }

        let mut headers = HttpHeaderBuilder::new();
        if let Some(user_agent) = &config.user_agent {
            headers = headers.with_user_agent(user_agent)?;
        }
        let default_headers = headers.with_custom_headers(&config.headers)?.build();
        let http_client = build_http_client_from_config(&config)?;

        Ok(ApiClient {
            base_url,
            config,
            default_headers,
            http_client,
            transport: self.transport,
            interceptors,
        })
    }
}

impl fmt::Debug for ApiClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("base_url", &self.base_url)
            .field("http_config", &self.http_config)
            .field("interceptors_len", &self.interceptors.len())
            .field("has_custom_transport", &self.transport.is_some())
            .field("http_debug", &self.http_debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
    use std::sync::Mutex;

    /// What the transport saw of one request.
    #[derive(Debug, Clone)]
    struct Seen {
        method: Method,
        url: String,
        version: Version,
        headers: HeaderMap,
        body: Bytes,
    }

    struct RecordingTransport {
        seen: Mutex<Vec<Seen>>,
        status: u16,
        reply: &'static str,
    }

    impl RecordingTransport {
        fn replying(status: u16, reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                status,
                reply,
            })
        }

        fn last(&self) -> Seen {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn execute(&self, mut request: Request) -> Result<Response, ClientError> {
            let body = match request.body_mut().take() {
                Some(body) => body.collect().await?.to_bytes(),
                None => Bytes::new(),
            };
            self.seen.lock().unwrap().push(Seen {
                method: request.method().clone(),
                url: request.url().to_string(),
                version: request.version(),
                headers: request.headers().clone(),
                body,
            });
            let response = http::Response::builder()
                .status(self.status)
                .body(self.reply)
                .unwrap();
            Ok(Response::from(response))
        }
    }

    /// Chunking off regardless of the environment.
    fn plain_config() -> HttpConfig {
        HttpConfig::builder().chunked_transfer(false).build()
    }

    fn client_with(transport: Arc<RecordingTransport>) -> ApiClient {
        ApiClient::builder()
            .with_base_url("http://files.invalid/api/")
            .with_http_config(plain_config())
            .with_transport(transport)
            .build()
            .unwrap()
    }

    fn count_chunked(client: &ApiClient) -> usize {
        client
            .interceptors()
            .ids()
            .into_iter()
            .filter(|id| *id == ForceChunkedMultipartInterceptor::ID)
            .count()
    }

    #[test]
    fn enable_is_idempotent() {
        let client = client_with(RecordingTransport::replying(200, ""));
        assert!(!client.is_chunked_transfer_enabled());
        assert_eq!(count_chunked(&client), 0);

        let client = client
            .enable_chunked_transfer()
            .unwrap()
            .enable_chunked_transfer()
            .unwrap()
            .enable_chunked_transfer()
            .unwrap();

        assert!(client.is_chunked_transfer_enabled());
        assert_eq!(count_chunked(&client), 1);
        assert_eq!(client.config().http_version(), HttpVersionPolicy::Http1Only);
    }

    #[test]
    fn enabling_one_client_leaves_clones_alone() {
        let plain = client_with(RecordingTransport::replying(200, ""));
        let chunked = plain.clone().enable_chunked_transfer().unwrap();
        assert!(chunked.is_chunked_transfer_enabled());
        assert!(!plain.is_chunked_transfer_enabled());
        assert_eq!(plain.config().http_version(), HttpVersionPolicy::Auto);
    }

    #[test]
    fn enabling_overrides_http2_prior_knowledge() {
        let client = ApiClient::builder()
            .with_base_url("http://files.invalid")
            .with_http_config(plain_config())
            .with_http_version(HttpVersionPolicy::Http2PriorKnowledge)
            .build()
            .unwrap();
        assert_eq!(
            client.config().http_version(),
            HttpVersionPolicy::Http2PriorKnowledge
        );

        let client = client.enable_chunked_transfer().unwrap();
        assert_eq!(client.config().http_version(), HttpVersionPolicy::Http1Only);
        let request = client.request(Method::POST, "/x").build().unwrap();
        assert_eq!(request.version(), Version::HTTP_11);
    }

    #[test]
    fn builder_flag_installs_interceptor_once() {
        let client = ApiClient::builder()
            .with_base_url("http://files.invalid")
            .with_chunked_transfer()
            .with_interceptor(Arc::new(ForceChunkedMultipartInterceptor::new()))
            .http_debug(true)
            .build()
            .unwrap();
        assert_eq!(
            client.interceptors().ids(),
            vec![LoggingInterceptor::ID, ForceChunkedMultipartInterceptor::ID]
        );
    }

    #[test]
    fn manually_installed_interceptor_pins_http1() {
        let client = ApiClient::builder()
            .with_base_url("http://files.invalid")
            .with_interceptor(Arc::new(ForceChunkedMultipartInterceptor::new()))
            .build()
            .unwrap();
        assert!(client.is_chunked_transfer_enabled());
        assert_eq!(client.config().http_version(), HttpVersionPolicy::Http1Only);
    }

    #[test]
    fn url_joins_with_single_slash() {
        let client = client_with(RecordingTransport::replying(200, ""));
        assert_eq!(client.base_url(), "http://files.invalid/api");
        assert_eq!(client.url("/uploads"), "http://files.invalid/api/uploads");
        assert_eq!(client.url("uploads"), "http://files.invalid/api/uploads");
        assert_eq!(client.url(""), "http://files.invalid/api");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ApiClient::new("not a url").unwrap_err();
        assert!(matches!(err, ClientError::ConfigurationError(_)));
        let err = ApiClient::builder().build().unwrap_err();
        assert!(matches!(err, ClientError::ConfigurationError(_)));
    }

    #[tokio::test]
    async fn multipart_upload_streams_without_length() {
        let transport = RecordingTransport::replying(201, r#"{"id":"u-1"}"#);
        let client = client_with(transport.clone())
            .enable_chunked_transfer()
            .unwrap();

        let payload = vec![0xABu8; 1024];
        let form = UploadForm::new()
            .bytes("file", "blob.bin", payload.clone())
            .unwrap();
        let response = client.upload("uploads", form).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.json::<serde_json::Value>().unwrap()["id"], "u-1");

        let seen = transport.last();
        assert_eq!(seen.method, Method::POST);
        assert_eq!(seen.url, "http://files.invalid/api/uploads");
        assert_eq!(seen.version, Version::HTTP_11);
        assert!(!seen.headers.contains_key(CONTENT_LENGTH));
        assert!(
            seen.headers[CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("multipart/form-data; boundary=")
        );
        let start = seen
            .body
            .windows(payload.len())
            .position(|w| w == payload.as_slice());
        assert!(start.is_some(), "payload bytes not found in body");
    }

    #[tokio::test]
    async fn multipart_upload_keeps_length_when_disabled() {
        let transport = RecordingTransport::replying(200, "ok");
        let client = client_with(transport.clone());

        let form = UploadForm::new().text("note", "hello");
        client.upload("uploads", form).await.unwrap();

        let seen = transport.last();
        let declared: usize = seen.headers[CONTENT_LENGTH]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(declared, seen.body.len());
    }

    #[tokio::test]
    async fn json_request_is_identical_with_chunking_enabled() {
        let payload = r#"{"name":"report","size":1024,"ok":10}"#;

        let mut seen = Vec::new();
        for enabled in [false, true] {
            let transport = RecordingTransport::replying(200, "{}");
            let mut client = client_with(transport.clone());
            if enabled {
                client = client.enable_chunked_transfer().unwrap();
            }
            let request = client
                .request(Method::POST, "/documents")
                .header(CONTENT_TYPE, "application/json")
                .header(CONTENT_LENGTH, "37")
                .version(Version::HTTP_11)
                .body(payload)
                .build()
                .unwrap();
            client.invoke(request).await.unwrap();
            seen.push(transport.last());
        }

        let (plain, chunked) = (&seen[0], &seen[1]);
        assert_eq!(plain.headers, chunked.headers);
        assert_eq!(plain.body, chunked.body);
        assert_eq!(chunked.headers[CONTENT_LENGTH], "37");
        assert_eq!(&chunked.body[..], payload.as_bytes());
    }

    #[tokio::test]
    async fn default_headers_are_applied() {
        let transport = RecordingTransport::replying(200, "");
        let client = ApiClient::builder()
            .with_base_url("http://files.invalid")
            .with_user_agent("uploader/2.0")
            .with_header("X-Tenant", "acme")
            .with_transport(transport.clone())
            .build()
            .unwrap();

        let request = client.request(Method::GET, "/ping").build().unwrap();
        client.invoke(request).await.unwrap();

        let seen = transport.last();
        assert_eq!(seen.headers["user-agent"], "uploader/2.0");
        assert_eq!(seen.headers["x-tenant"], "acme");
    }

    #[tokio::test]
    async fn header_names_differing_in_case_keep_last_value() {
        let transport = RecordingTransport::replying(200, "");
        let client = ApiClient::builder()
            .with_base_url("http://files.invalid")
            .with_header("X-Tenant", "acme")
            .with_header("x-tenant", "globex")
            .with_transport(transport.clone())
            .build()
            .unwrap();
        assert_eq!(client.config().headers.len(), 1);

        let request = client.request(Method::GET, "/ping").build().unwrap();
        client.invoke(request).await.unwrap();

        let seen = transport.last();
        assert_eq!(seen.headers.get_all("x-tenant").iter().count(), 1);
        assert_eq!(seen.headers["x-tenant"], "globex");
    }

    #[tokio::test]
    async fn non_success_status_becomes_api_error() {
        let transport = RecordingTransport::replying(413, r#"{"error":"too large"}"#);
        let client = client_with(transport);

        let request = client.request(Method::GET, "/big").build().unwrap();
        match client.invoke(request).await {
            Err(ClientError::ApiError {
                code: 413,
                details: Some(details),
                ..
            }) => assert_eq!(details["error"], "too large"),
            other => panic!("expected ApiError(413), got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn execute_returns_raw_response_for_errors() {
        let transport = RecordingTransport::replying(500, "");
        let client = client_with(transport);

        let request = client.request(Method::GET, "/boom").build().unwrap();
        let response = client.execute(request).await.unwrap();
        assert_eq!(response.status(), 500);
    }
}

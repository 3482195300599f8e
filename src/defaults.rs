//! Default Configuration Values

use std::time::Duration;

/// HTTP client default configurations
pub mod http {
    use super::*;

    /// Default request timeout for HTTP requests. Covers the whole upload.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Default connection timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("chunked-upload/", env!("CARGO_PKG_VERSION"));
}

/// Environment variables consulted by `HttpConfig::default()`.
pub mod env {
    /// Enables chunked transfer for multipart bodies when set to `1`, `true`,
    /// `on` or `yes`.
    pub const TRANSFER_CHUNKED: &str = "CHUNKED_UPLOAD_TRANSFER_CHUNKED";
}

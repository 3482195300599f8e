//! chunked-upload
//!
//! A small HTTP API client built on `reqwest` that can force multipart
//! uploads to use `Transfer-Encoding: chunked` instead of a precomputed
//! `Content-Length`.
//!
//! ```rust,no_run
//! use chunked_upload::{ApiClient, UploadForm};
//!
//! # async fn run() -> Result<(), chunked_upload::ClientError> {
//! let client = ApiClient::builder()
//!     .with_base_url("https://files.example.com")
//!     .with_chunked_transfer()
//!     .build()?;
//!
//! let form = UploadForm::new()
//!     .text("description", "nightly backup")
//!     .file("archive", "/var/backups/nightly.tar.gz")
//!     .await?;
//! client.upload("/v1/uploads", form).await?;
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]

pub mod body;
pub mod client;
pub mod defaults;
pub mod error;
pub mod execution;
pub mod types;
pub mod utils;

pub use body::{ChunkedBody, SingleUse};
pub use client::{ApiClient, ApiClientBuilder, ApiResponse};
pub use error::{ClientError, ErrorCategory};
pub use execution::http::chunked::{ForceChunkedMultipartInterceptor, force_chunked_multipart};
pub use execution::http::interceptor::{HttpInterceptor, InterceptorChain, LoggingInterceptor, Next};
pub use execution::http::transport::HttpTransport;
pub use execution::upload::UploadForm;
pub use types::{HttpConfig, HttpConfigBuilder, HttpVersionPolicy};

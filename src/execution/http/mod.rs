//! HTTP Utilities
//!
//! This module contains HTTP-related utilities:
//! - HTTP client configuration
//! - Header management
//! - HTTP interceptors and the transport they end in
//! - Chunked transfer for multipart bodies

pub mod chunked;
pub mod client;
pub mod headers;
pub mod interceptor;
pub mod transport;

// Re-export main types
pub use chunked::*;
pub use client::*;
pub use headers::*;
pub use interceptor::*;
pub use transport::*;

//! Error Handling Module
//!
//! - Core error types (`ClientError`, `ErrorCategory`)
//! - Type conversions from `reqwest`, `std::io` and `serde_json` errors
//!
//! # Example
//!
//! ```rust,ignore
//! use chunked_upload::error::{ClientError, ErrorCategory};
//!
//! let error = ClientError::api_error(404, "Not found");
//! assert_eq!(error.category(), ErrorCategory::Client);
//! assert!(!error.is_retryable());
//! ```

mod conversions;
pub mod types;

pub use types::*;

//! Shared configuration types.

pub mod http;

pub use self::http::{HttpConfig, HttpConfigBuilder, HttpVersionPolicy};

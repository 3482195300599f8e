//! Utility helpers.

pub mod mime;

pub use self::mime::{guess_mime, is_multipart};

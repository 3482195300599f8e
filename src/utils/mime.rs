//! MIME Type Utilities
//!
//! Media type inspection for outgoing requests and extension-based
//! detection for upload parts.

use reqwest::header::{CONTENT_TYPE, HeaderMap};

/// Parse the request's `Content-Type` header.
///
/// Returns `None` when the header is absent, not valid UTF-8, or not a valid
/// media type.
pub fn content_type(headers: &HeaderMap) -> Option<mime::Mime> {
    headers
        .get(CONTENT_TYPE)?
        .to_str()
        .ok()?
        .parse::<mime::Mime>()
        .ok()
}

/// Whether the declared media type has the top-level type `multipart`.
///
/// The comparison is case-insensitive (`Multipart/Form-Data` matches).
pub fn is_multipart(headers: &HeaderMap) -> bool {
    content_type(headers).is_some_and(|m| m.type_() == mime::MULTIPART)
}

/// Guess MIME by file name or path (extension-based)
pub fn guess_mime_from_path(path: &str) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Guess MIME by file name, otherwise `application/octet-stream`
pub fn guess_mime(path: &str) -> String {
    guess_mime_from_path(path).unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

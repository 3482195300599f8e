//! Chunked transfer for multipart bodies.
//!
//! reqwest computes a `Content-Length` for multipart forms whose parts all
//! have a known size, which makes hyper frame the body by length. This
//! interceptor hides the length of multipart bodies and drops the header, so
//! on HTTP/1.1 the body goes out with `Transfer-Encoding: chunked`.
//!
//! HTTP/2 has no chunked framing; clients that install this interceptor are
//! pinned to HTTP/1.1 (see [`HttpConfig::enable_chunked_transfer`]).
//!
//! [`HttpConfig::enable_chunked_transfer`]: crate::types::HttpConfig::enable_chunked_transfer

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Request, Response};

use super::interceptor::{HttpInterceptor, Next};
use crate::body::{ChunkedBody, SingleUse};
use crate::error::ClientError;
use crate::utils::mime::is_multipart;

/// Forces multipart request bodies to an unknown content length.
#[derive(Clone, Debug, Default)]
pub struct ForceChunkedMultipartInterceptor;

impl ForceChunkedMultipartInterceptor {
    pub const ID: &'static str = "force-chunked-multipart";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HttpInterceptor for ForceChunkedMultipartInterceptor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    async fn intercept(&self, request: Request, next: Next<'_>) -> Result<Response, ClientError> {
        next.run(force_chunked_multipart(request)).await
    }
}

/// Rewrite a multipart request so its body streams without a declared
/// length.
///
/// Requests without a body, or whose `Content-Type` is absent or not
/// `multipart/*`, are returned untouched. Otherwise only the body wrapper and
/// the removal of `Content-Length` differ; method, URL, version and all other
/// headers are kept.
pub fn force_chunked_multipart(mut request: Request) -> Request {
    if request.body().is_none() {
        return request;
    }
    if !is_multipart(request.headers()) {
        tracing::trace!(
            target: "chunked_upload::http",
            url = %request.url(),
            "not a multipart body, leaving length as is"
        );
        return request;
    }

    let Some(body) = request.body_mut().take() else {
        return request;
    };
    let chunked = ChunkedBody::new(body);
    let one_shot = chunked.is_one_shot();
    *request.body_mut() = Some(chunked.into());

    // Drops every value, not only the first.
    let removed = request.headers_mut().remove(CONTENT_LENGTH);

    tracing::debug!(
        target: "chunked_upload::http",
        method = %request.method(),
        url = %request.url(),
        content_length = ?removed,
        one_shot,
        "forcing chunked transfer for multipart body"
    );
    request
}

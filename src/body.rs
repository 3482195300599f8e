//! Request body adapters.
//!
//! [`ChunkedBody`] wraps any [`http_body::Body`] and hides its length, so the
//! HTTP/1.1 encoder falls back to `Transfer-Encoding: chunked`. Frames and
//! end-of-stream are delegated to the wrapped body unchanged.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use http_body_util::BodyDataStream;
use pin_project::pin_project;

/// Bodies that know whether they can be sent only once.
///
/// A one-shot body is consumed by the first attempt to send it, so the
/// request cannot be replayed on retry or redirect.
pub trait SingleUse {
    fn is_one_shot(&self) -> bool;
}

impl SingleUse for reqwest::Body {
    /// Buffered bodies can be cloned by reqwest; streaming bodies cannot.
    fn is_one_shot(&self) -> bool {
        self.as_bytes().is_none()
    }
}

impl<D> SingleUse for http_body_util::Full<D> {
    fn is_one_shot(&self) -> bool {
        false
    }
}

/// Body decorator that reports an unknown length.
///
/// The one-shot capability of the wrapped body is recorded, not preserved:
/// converting into a [`reqwest::Body`] always yields a streaming body, so a
/// request carrying it cannot be replayed on a 307/308 redirect even when the
/// original body was buffered.
#[pin_project]
#[derive(Debug)]
pub struct ChunkedBody<B> {
    #[pin]
    inner: B,
    one_shot: bool,
}

impl<B: SingleUse> ChunkedBody<B> {
    /// Wrap `inner`, carrying over its one-shot capability.
    pub fn new(inner: B) -> Self {
        let one_shot = inner.is_one_shot();
        Self { inner, one_shot }
    }
}

impl<B> ChunkedBody<B> {
    /// Wrap a body that does not implement [`SingleUse`]. It is recorded as
    /// reusable.
    pub fn assume_reusable(inner: B) -> Self {
        Self {
            inner,
            one_shot: false,
        }
    }
}

impl<B> SingleUse for ChunkedBody<B> {
    fn is_one_shot(&self) -> bool {
        self.one_shot
    }
}

impl<B: HttpBody> HttpBody for ChunkedBody<B> {
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.project().inner.poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::default()
    }
}

/// The result is always streaming (`as_bytes()` returns `None`).
impl<B> From<ChunkedBody<B>> for reqwest::Body
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    Bytes: From<B::Data>,
{
    fn from(body: ChunkedBody<B>) -> Self {
        reqwest::Body::wrap_stream(BodyDataStream::new(body))
    }
}

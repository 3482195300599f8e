//! HTTP Interceptor interfaces
//!
//! Interceptors form an ordered chain around the transport. Each one receives
//! the outgoing request and a [`Next`] handle; it may rewrite the request,
//! forward it, and observe (or replace) the response. Every interceptor has a
//! stable id, and a chain never holds two interceptors with the same id.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Request, Response};

use super::transport::HttpTransport;
use crate::error::ClientError;

/// HTTP interceptor trait
#[async_trait]
pub trait HttpInterceptor: Send + Sync {
    /// Stable identifier used to prevent duplicate installation.
    fn id(&self) -> &'static str;

    /// Process `request` and hand it to `next`. The default forwards it
    /// unchanged.
    async fn intercept(&self, request: Request, next: Next<'_>) -> Result<Response, ClientError> {
        next.run(request).await
    }
}

/// The remainder of the chain after the current interceptor.
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn HttpInterceptor>],
    transport: &'a dyn HttpTransport,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        interceptors: &'a [Arc<dyn HttpInterceptor>],
        transport: &'a dyn HttpTransport,
    ) -> Self {
        Self {
            interceptors,
            transport,
        }
    }

    /// Run the rest of the chain, ending at the transport.
    pub async fn run(self, request: Request) -> Result<Response, ClientError> {
        match self.interceptors.split_first() {
            Some((current, rest)) => {
                current
                    .intercept(request, Next::new(rest, self.transport))
                    .await
            }
            None => self.transport.execute(request).await,
        }
    }
}

/// Ordered interceptor list, unique by [`HttpInterceptor::id`].
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.interceptors.iter().any(|i| i.id() == id)
    }

    /// Append `interceptor` unless one with the same id is installed.
    /// Returns whether it was added.
    pub fn push(&mut self, interceptor: Arc<dyn HttpInterceptor>) -> bool {
        if self.contains(interceptor.id()) {
            return false;
        }
        self.interceptors.push(interceptor);
        true
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.id()).collect()
    }

    /// Send `request` through every interceptor, then `transport`.
    pub async fn run(
        &self,
        request: Request,
        transport: &dyn HttpTransport,
    ) -> Result<Response, ClientError> {
        Next::new(&self.interceptors, transport).run(request).await
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

/// A simple logging interceptor backed by `tracing` (no sensitive data).
#[derive(Clone, Debug, Default)]
pub struct LoggingInterceptor;

impl LoggingInterceptor {
    pub const ID: &'static str = "logging";
}

#[async_trait]
impl HttpInterceptor for LoggingInterceptor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    async fn intercept(&self, request: Request, next: Next<'_>) -> Result<Response, ClientError> {
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(target: "chunked_upload::http", %method, %url, "sending request");

        let started = Instant::now();
        let result = next.run(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => {
                tracing::debug!(target: "chunked_upload::http", %method, %url, status = %response.status().as_u16(), elapsed_ms, "response received")
            }
            Err(error) => {
                tracing::debug!(target: "chunked_upload::http", %method, %url, err = %error, elapsed_ms, "request error")
            }
        }
        result
    }
}

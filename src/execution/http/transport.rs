//! HTTP transport abstraction.
//!
//! The transport is the last stage of the interceptor chain: it puts the
//! final request on the wire. `reqwest::Client` is the default; a custom
//! transport can observe the exact request (headers, version, body frames)
//! and return a synthetic response.

use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::{Request, Response};

/// Sends a fully prepared request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, ClientError>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        reqwest::Client::execute(self, request)
            .await
            .map_err(ClientError::from)
    }
}

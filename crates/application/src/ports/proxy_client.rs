//! Proxy client port

use std::future::Future;

use relay_domain::ResolvedRequest;
use serde_json::Value;

/// What the proxy sent back, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyReply {
    /// HTTP status of the proxy response.
    pub status: u16,
    /// Decoded JSON body, or `{"text": raw}` when the body was not JSON.
    pub payload: Value,
}

impl ProxyReply {
    /// Creates a reply.
    #[must_use]
    pub const fn new(status: u16, payload: Value) -> Self {
        Self { status, payload }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Errors raised before a proxy reply was obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    /// The proxy could not be reached (connect, timeout, reset).
    #[error("{0}")]
    Transport(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Port for the external service that performs the outbound HTTP call.
///
/// Implementations only shape and carry the payload; classification of
/// failures is done by the dispatcher.
pub trait ProxyClient: Send + Sync {
    /// Forwards the request to the proxy.
    ///
    /// # Errors
    ///
    /// Returns an error if no reply could be obtained. Non-2xx replies are
    /// returned as `Ok`.
    fn forward(
        &self,
        request: &ResolvedRequest,
    ) -> impl Future<Output = Result<ProxyReply, ProxyError>> + Send;
}

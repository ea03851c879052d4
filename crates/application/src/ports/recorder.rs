//! Recorder port
//!
//! Receives every successful exchange after the dispatcher has already
//! returned its outcome.

use async_trait::async_trait;
use relay_domain::{QueryParam, ResolvedRequest};
use serde_json::Value;

/// Errors raised while persisting records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The record store rejected or failed the write.
    #[error("persistence write failed: {0}")]
    Write(String),

    /// The record store could not be read.
    #[error("persistence read failed: {0}")]
    Read(String),

    /// The operation needs an identity and none is available.
    #[error("not signed in")]
    Unauthenticated,
}

/// A sent request together with its response, as handed to the recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedExchange {
    /// The resolved request that was sent.
    pub request: ResolvedRequest,
    /// Body as authored, resolved and parsed. Kept even for methods that
    /// send none; `None` when blank or not JSON.
    pub body: Option<Value>,
    /// Query parameters as authored.
    pub params: Vec<QueryParam>,
    /// Raw headers text as authored, if any.
    pub headers_text: Option<String>,
    /// Response payload.
    pub response: Value,
    /// Collection to also file the request under.
    pub collection_id: Option<String>,
}

impl RecordedExchange {
    /// Creates an exchange with no authoring context; the recorded body is
    /// the one that was sent.
    #[must_use]
    pub fn new(request: ResolvedRequest, response: Value) -> Self {
        Self {
            body: request.body.clone(),
            request,
            params: Vec::new(),
            headers_text: None,
            response,
            collection_id: None,
        }
    }
}

/// Persists sent requests as history or collection items.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Records one exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if any write failed. Callers log and continue.
    async fn record(&self, exchange: RecordedExchange) -> Result<(), RecordError>;
}

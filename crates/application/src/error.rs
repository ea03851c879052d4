//! Application error types

use thiserror::Error;

use crate::ports::StorageError;

/// Errors that abort building a request descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The body is not valid JSON after placeholders were resolved.
    #[error("Body must be valid JSON: {0}")]
    MalformedBody(String),
}

/// Errors raised by the environment store.
#[derive(Debug, Error)]
pub enum EnvironmentStoreError {
    /// The persistence surface could not be read or written.
    #[error("environment storage error: {0}")]
    Storage(#[from] StorageError),

    /// The environment list could not be encoded.
    #[error("environment serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for environment store operations.
pub type EnvironmentStoreResult<T> = Result<T, EnvironmentStoreError>;

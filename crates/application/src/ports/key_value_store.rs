//! Key-value persistence port
//!
//! Environments are persisted as whole-value JSON blobs under fixed keys.

use std::future::Future;

/// Errors that can occur while reading or writing a record.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A store of string values addressed by string keys.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str)
    -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

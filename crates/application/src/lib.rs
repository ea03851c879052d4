//! Relay Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for storage, the proxy and the record store)
//! - The variable resolver and request template builder
//! - The environment store, dispatcher and history recorder

pub mod dispatch_request;
pub mod error;
pub mod ports;
pub mod request_builder;
pub mod use_cases;
pub mod variable_resolver;

pub use dispatch_request::Dispatcher;
pub use error::{BuildError, EnvironmentStoreError, EnvironmentStoreResult};
pub use ports::{
    Clock, IdentityProvider, KeyValueStore, NetworkStatus, ProxyClient, ProxyError, ProxyReply,
    RecordError, RecordStore, RecordedExchange, Recorder, StorageError,
};
pub use request_builder::{HeaderSource, RequestBuilder};
pub use use_cases::{EnvironmentStore, HistoryRecorder};
pub use variable_resolver::{ResolutionResult, VariableResolver, resolve};

//! Relay Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod backend;
pub mod persistence;
pub mod serialization;
pub mod settings;

pub use adapters::{ProbeNetworkStatus, ReqwestProxyClient, StaticIdentityProvider, SystemClock};
pub use backend::BackendRecordStore;
pub use persistence::{FileKeyValueStore, FileRecordStore};
pub use serialization::{
    SerializationError, from_json, from_json_bytes, normalize_json, to_json_stable,
    to_json_stable_bytes,
};
pub use settings::{DEFAULT_PROXY_URL, RelaySettings, SettingsError};

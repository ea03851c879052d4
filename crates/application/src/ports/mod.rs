//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod clock;
mod identity_provider;
mod key_value_store;
mod network_status;
mod proxy_client;
mod record_store;
mod recorder;

pub use clock::Clock;
pub use identity_provider::IdentityProvider;
pub use key_value_store::{KeyValueStore, StorageError};
pub use network_status::NetworkStatus;
pub use proxy_client::{ProxyClient, ProxyError, ProxyReply};
pub use record_store::RecordStore;
pub use recorder::{RecordError, RecordedExchange, Recorder};

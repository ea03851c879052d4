//! Network status port

use std::future::Future;

/// Reports whether the local network is usable at all.
pub trait NetworkStatus: Send + Sync {
    /// Returns false when the host has no usable network.
    fn is_online(&self) -> impl Future<Output = bool> + Send;
}

//! Identity provider port

use async_trait::async_trait;
use relay_domain::Identity;

/// Supplies the identity attached to persisted records.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in identity, or `None` when nobody is signed in.
    async fn current(&self) -> Option<Identity>;
}

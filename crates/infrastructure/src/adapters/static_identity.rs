//! Identity taken from configuration.

use async_trait::async_trait;
use relay_application::ports::IdentityProvider;
use relay_domain::Identity;

/// Hands out a fixed identity, or none when the user is not signed in.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    identity: Option<Identity>,
}

impl StaticIdentityProvider {
    /// Creates a provider for the given identity.
    #[must_use]
    pub const fn new(identity: Option<Identity>) -> Self {
        Self { identity }
    }

    /// Builds the identity from a configured user id and optional token.
    ///
    /// A missing or blank user id means nobody is signed in.
    #[must_use]
    pub fn from_parts(user_id: Option<&str>, access_token: Option<&str>) -> Self {
        let identity = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                let identity = Identity::new(id);
                match access_token.map(str::trim).filter(|t| !t.is_empty()) {
                    Some(token) => identity.with_token(token),
                    None => identity,
                }
            });
        Self { identity }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

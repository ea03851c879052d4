//! Infrastructure adapters

mod network_status;
mod reqwest_proxy;
mod static_identity;
mod system_clock;

pub use network_status::ProbeNetworkStatus;
pub use reqwest_proxy::ReqwestProxyClient;
pub use static_identity::StaticIdentityProvider;
pub use system_clock::SystemClock;

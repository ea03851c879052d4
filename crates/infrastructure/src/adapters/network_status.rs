//! Network availability probe.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use relay_application::ports::NetworkStatus;
use tokio::net::UdpSocket;

const DEFAULT_PROBE: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(1, 1, 1, 1), 53));

/// Reports the host as online when it has a route to the probe address.
///
/// Connecting a UDP socket only consults the routing table; no packet is
/// sent.
#[derive(Debug, Clone, Copy)]
pub struct ProbeNetworkStatus {
    probe: SocketAddr,
}

impl ProbeNetworkStatus {
    /// Creates a probe against a public resolver address.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            probe: DEFAULT_PROBE,
        }
    }

    /// Creates a probe against a specific address.
    #[must_use]
    pub const fn with_probe(probe: SocketAddr) -> Self {
        Self { probe }
    }
}

impl Default for ProbeNetworkStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkStatus for ProbeNetworkStatus {
    async fn is_online(&self) -> bool {
        let bind: SocketAddr = if self.probe.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = match UdpSocket::bind(bind).await {
            Ok(socket) => socket,
            Err(e) => {
                tracing::debug!(error = %e, "network probe could not bind");
                return false;
            }
        };

        match socket.connect(self.probe).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, probe = %self.probe, "no route to probe address");
                false
            }
        }
    }
}

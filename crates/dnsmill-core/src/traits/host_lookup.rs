// # Host Lookup Traits
//
// Local address sources used by the host address resolver. The system
// implementations live in `resolver::system`; tests substitute tables.

use async_trait::async_trait;
use std::net::IpAddr;

/// Enumerates the addresses bound to a network interface
pub trait InterfaceSource: Send + Sync {
    /// Bare IP addresses of interface `name`, without prefix lengths.
    ///
    /// An unknown interface is an [`crate::Error::Interface`].
    fn addresses(&self, name: &str) -> Result<Vec<IpAddr>, crate::Error>;
}

/// Resolves hostnames to IP addresses
#[async_trait]
pub trait HostnameLookup: Send + Sync {
    /// Look up `host`. An empty answer is an error.
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, crate::Error>;
}

// # IP Echo Trait
//
// Defines the transport used by external IP discovery: an HTTP endpoint that
// answers with the caller's public IP as plain text.
//
// ## Implementations
//
// - reqwest-based: `dnsmill-ip-http` crate

use async_trait::async_trait;
use std::net::IpAddr;

use crate::host_address::IpFamily;

/// How a probe reaches the echo endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeRoute {
    /// Any local address of the given family
    Family(IpFamily),
    /// A connection bound to this local source address
    LocalAddr(IpAddr),
}

/// An IP echo endpoint
///
/// Implementations must not retry. Discovery owns the deadline and decides
/// how failures are aggregated.
#[async_trait]
pub trait IpEcho: Send + Sync {
    /// Endpoint location, for diagnostics
    fn endpoint(&self) -> &str;

    /// Perform one probe over `route`, returning the raw response body
    async fn probe(&self, route: ProbeRoute) -> Result<String, crate::Error>;
}

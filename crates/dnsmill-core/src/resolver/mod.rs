//! Host address resolution
//!
//! [`HostResolver`] turns a [`HostAddress`] into IP addresses. The type flag
//! picks the strategy, checked in this order:
//!
//! 1. `ip`: parse the address as an IP literal
//! 2. `interface`: addresses bound to the named interface, filtered by
//!    `ipv4`/`ipv6`, or replaced by the external IPs reachable through them
//!    when `external` is also set
//! 3. `external`: the machine's external IP per address family
//! 4. `hostname`: a DNS lookup, filtered by `ipv4`/`ipv6`
//!
//! Without a type flag the resolver tries `ip`, `interface` and `hostname`
//! in turn and keeps the first that succeeds. `external` is never inferred.

mod external;
mod system;

pub use external::{ExternalIpDiscovery, LOCAL_ADDRS_TIMEOUT};
pub use system::{SystemHostnames, SystemInterfaces};

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Error, Result, ResultExt};
use crate::host_address::{HostAddress, HostAddressFlag, HostAddresses, IpFamily, parse_ip_literal};
use crate::traits::{HostnameLookup, InterfaceSource, IpEcho};

/// Address types tried, in order, when none is given
const INFERENCE_ORDER: [HostAddressFlag; 3] = [
    HostAddressFlag::Ip,
    HostAddressFlag::Interface,
    HostAddressFlag::Hostname,
];

/// Resolves host addresses into IP addresses
#[derive(Clone)]
pub struct HostResolver {
    interfaces: Arc<dyn InterfaceSource>,
    hostnames: Arc<dyn HostnameLookup>,
    external: ExternalIpDiscovery,
}

impl HostResolver {
    pub fn new(
        interfaces: Arc<dyn InterfaceSource>,
        hostnames: Arc<dyn HostnameLookup>,
        external: ExternalIpDiscovery,
    ) -> Self {
        Self {
            interfaces,
            hostnames,
            external,
        }
    }

    /// A resolver backed by the local machine and the given echo endpoint
    pub fn system(echo: Arc<dyn IpEcho>) -> Self {
        Self::new(
            Arc::new(SystemInterfaces),
            Arc::new(SystemHostnames::new()),
            ExternalIpDiscovery::new(echo),
        )
    }

    /// External IP discovery used by this resolver
    pub fn external(&self) -> &ExternalIpDiscovery {
        &self.external
    }

    /// Resolve every address in order and concatenate the results.
    ///
    /// The first failure aborts the whole list.
    pub async fn resolve_all(&self, addrs: &HostAddresses) -> Result<Vec<IpAddr>> {
        let mut ips = Vec::with_capacity(addrs.len());
        for addr in addrs {
            let resolved = self
                .resolve(addr)
                .await
                .with_context(|| format!("failed to resolve address {:?}", addr.to_string()))?;
            ips.extend(resolved);
        }
        Ok(ips)
    }

    /// Resolve a single host address
    pub async fn resolve(&self, addr: &HostAddress) -> Result<Vec<IpAddr>> {
        match addr.flags.kind() {
            Some(kind) => self.resolve_as(addr, kind).await,
            None => self.infer(addr).await,
        }
    }

    async fn infer(&self, addr: &HostAddress) -> Result<Vec<IpAddr>> {
        for kind in INFERENCE_ORDER {
            match self.resolve_as(addr, kind).await {
                Ok(ips) => {
                    debug!(address = %addr, inferred = %kind, "inferred host address type");
                    return Ok(ips);
                }
                Err(err) => {
                    trace!(address = %addr, attempted = %kind, error = %err, "address type did not match");
                }
            }
        }

        Err(Error::CannotGuess(addr.to_string()))
    }

    async fn resolve_as(&self, addr: &HostAddress, kind: HostAddressFlag) -> Result<Vec<IpAddr>> {
        match kind {
            HostAddressFlag::Ip => Ok(vec![parse_ip_literal(&addr.address)?]),
            HostAddressFlag::Interface => self.resolve_interface(addr).await,
            HostAddressFlag::External => self.resolve_external(addr).await,
            HostAddressFlag::Hostname => self.resolve_hostname(addr).await,
            HostAddressFlag::Ipv4 | HostAddressFlag::Ipv6 => Err(Error::parse(format!(
                "{kind} is not an address type"
            ))),
        }
    }

    async fn resolve_interface(&self, addr: &HostAddress) -> Result<Vec<IpAddr>> {
        let locals = self.interfaces.addresses(&addr.address)?;

        if let Some(family) = addr.flags.family() {
            return Ok(locals.into_iter().filter(|ip| family.matches(ip)).collect());
        }

        if addr.flags.has(HostAddressFlag::External) {
            return self.external.for_local_addrs(&locals).await.with_context(|| {
                format!(
                    "failed to resolve external IPs for interface {:?} using {:?}",
                    addr.address,
                    self.external.endpoint()
                )
            });
        }

        Ok(locals)
    }

    async fn resolve_external(&self, addr: &HostAddress) -> Result<Vec<IpAddr>> {
        if !addr.address.is_empty() {
            return Err(Error::ExternalWithAddress(addr.address.clone()));
        }

        let families = match addr.flags.family() {
            Some(family) => vec![family],
            None => vec![IpFamily::V4, IpFamily::V6],
        };

        self.external
            .for_families(&families)
            .await
            .with_context(|| "failed to resolve external IPs")
    }

    async fn resolve_hostname(&self, addr: &HostAddress) -> Result<Vec<IpAddr>> {
        let ips = self.hostnames.lookup(&addr.address).await?;

        let Some(family) = addr.flags.family() else {
            return Ok(ips);
        };

        let filtered: Vec<IpAddr> = ips.into_iter().filter(|ip| family.matches(ip)).collect();
        if filtered.is_empty() {
            let version = match family {
                IpFamily::V4 => "IPv4",
                IpFamily::V6 => "IPv6",
            };
            return Err(Error::hostname(
                &addr.address,
                format!("no {version} addresses found"),
            ));
        }
        Ok(filtered)
    }
}

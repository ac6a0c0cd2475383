//! System address sources
//!
//! Interface enumeration through `if-addrs` and hostname lookups through
//! `hickory-resolver` using the host's resolver configuration.

use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use tracing::warn;

use crate::error::{Error, Result};
use crate::traits::{HostnameLookup, InterfaceSource};

/// Interfaces of the local machine
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn addresses(&self, name: &str) -> Result<Vec<IpAddr>> {
        let interfaces =
            if_addrs::get_if_addrs().map_err(|err| Error::interface(name, err.to_string()))?;

        let addrs: Vec<IpAddr> = interfaces
            .iter()
            .filter(|iface| iface.name == name)
            .map(|iface| iface.ip())
            .collect();

        // if-addrs only reports interfaces that carry an address
        if addrs.is_empty() {
            return Err(Error::interface(name, "no such network interface"));
        }

        Ok(addrs)
    }
}

/// Hostname lookups through the system resolver configuration
#[derive(Clone)]
pub struct SystemHostnames {
    resolver: TokioResolver,
}

impl SystemHostnames {
    /// Build a resolver from the host configuration (e.g. `/etc/resolv.conf`),
    /// falling back to the library defaults when it cannot be read.
    pub fn new() -> Self {
        let resolver = match TokioResolver::builder_tokio() {
            Ok(builder) => builder.build(),
            Err(err) => {
                warn!("failed to load system DNS configuration, falling back to defaults: {err}");
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .build()
            }
        };
        Self { resolver }
    }
}

impl Default for SystemHostnames {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostnameLookup for SystemHostnames {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        let lookup = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|err| Error::hostname(host, err.to_string()))?;

        let ips: Vec<IpAddr> = lookup.iter().collect();
        if ips.is_empty() {
            return Err(Error::hostname(host, "no IP addresses found"));
        }
        Ok(ips)
    }
}

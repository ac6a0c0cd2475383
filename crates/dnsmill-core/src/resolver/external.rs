//! External IP discovery
//!
//! Discovers the machine's externally visible addresses by probing an
//! [`IpEcho`] endpoint, either once per address family or once per local
//! source address. Partial success is success: failed probes are only
//! reported when nothing resolved.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};
use crate::host_address::{IpFamily, parse_ip_literal};
use crate::traits::{IpEcho, ProbeRoute};

/// Aggregate deadline for probing every local address of one interface
pub const LOCAL_ADDRS_TIMEOUT: Duration = Duration::from_secs(10);

/// External IP discovery over an echo endpoint
#[derive(Clone)]
pub struct ExternalIpDiscovery {
    echo: Arc<dyn IpEcho>,
    local_addrs_timeout: Duration,
}

impl ExternalIpDiscovery {
    pub fn new(echo: Arc<dyn IpEcho>) -> Self {
        Self {
            echo,
            local_addrs_timeout: LOCAL_ADDRS_TIMEOUT,
        }
    }

    /// Override the aggregate deadline of [`Self::for_local_addrs`]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.local_addrs_timeout = timeout;
        self
    }

    /// The echo endpoint, for diagnostics
    pub fn endpoint(&self) -> &str {
        self.echo.endpoint()
    }

    /// Probe once per family, in the order given.
    pub async fn for_families(&self, families: &[IpFamily]) -> Result<Vec<IpAddr>> {
        let mut addrs = Vec::with_capacity(families.len());
        let mut errors = Vec::new();

        for &family in families {
            match self.probe(ProbeRoute::Family(family)).await {
                Ok(ip) => addrs.push(ip),
                Err(err) => {
                    debug!(network = family.network(), error = %err, "external IP probe failed");
                    errors.push(err.context(format!(
                        "failed to resolve external IP using {}",
                        family.network()
                    )));
                }
            }
        }

        if addrs.is_empty() {
            return Err(Error::join(errors).unwrap_or_else(|| {
                Error::external_ip(format!(
                    "no external IP addresses resolved using {:?}",
                    self.endpoint()
                ))
            }));
        }

        Ok(addrs)
    }

    /// Probe once per local source address under the aggregate deadline.
    ///
    /// The result is sorted by string form and deduplicated.
    pub async fn for_local_addrs(&self, locals: &[IpAddr]) -> Result<Vec<IpAddr>> {
        let deadline = Instant::now() + self.local_addrs_timeout;

        let mut addrs = Vec::with_capacity(locals.len());
        let mut errors = Vec::new();

        for &local in locals {
            let probe = self.probe(ProbeRoute::LocalAddr(local));
            let result = match tokio::time::timeout_at(deadline, probe).await {
                Ok(result) => result,
                Err(_) => Err(Error::external_ip(format!(
                    "deadline of {:?} exceeded",
                    self.local_addrs_timeout
                ))),
            };

            match result {
                Ok(ip) => addrs.push(ip),
                Err(err) => {
                    debug!(local = %local, error = %err, "external IP probe failed");
                    errors.push(err.context(format!(
                        "failed to resolve external IP for local address {:?}",
                        local.to_string()
                    )));
                }
            }
        }

        addrs.sort_by_cached_key(IpAddr::to_string);
        addrs.dedup();

        if addrs.is_empty() {
            return Err(Error::join(errors).unwrap_or_else(|| {
                Error::external_ip(format!(
                    "no external IP addresses resolved for local addresses: {locals:?}"
                ))
            }));
        }

        Ok(addrs)
    }

    async fn probe(&self, route: ProbeRoute) -> Result<IpAddr> {
        let body = self.echo.probe(route).await?;
        let body = body.trim();
        parse_ip_literal(body)
            .map_err(|err| err.context(format!("unexpected response from {:?}", self.endpoint())))
    }
}

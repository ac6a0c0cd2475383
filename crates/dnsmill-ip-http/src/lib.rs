// # HTTP IP Echo
//
// This crate provides the HTTP transport behind dnsmill's external IP
// discovery.
//
// ## Purpose
//
// An IP echo endpoint (e.g. ifconfig.me) answers a plain GET with the
// caller's address as seen from the internet. Probing it over a chosen
// route tells us which external address that route maps to:
// - **per family**: bind the unspecified address of the family so the
//   connection is forced over IPv4 or IPv6
// - **per local address**: bind one concrete local address, so the probe
//   leaves through the interface owning it
//
// ## Architecture
//
// Each probe builds a dedicated `reqwest::Client` bound to its route with a
// short connect timeout. The response body is returned untouched; parsing
// it as an IP is done by `dnsmill_core::ExternalIpDiscovery`.

use dnsmill_core::traits::{IpEcho, ProbeRoute};
use dnsmill_core::{Error, IpFamily, Result};

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use tracing::debug;

/// Echo endpoint used when none is configured
pub const DEFAULT_ECHO_URL: &str = "https://ifconfig.me/ip";

/// Environment variable overriding the echo endpoint
pub const ECHO_URL_ENV: &str = "DNSMILL_EXTERNAL_IP_URL";

/// Connect timeout for one probe
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Overall timeout for one probe, including reading the body
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// IP echo endpoint reached over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpIpEcho {
    url: String,
    dial_timeout: Duration,
}

impl HttpIpEcho {
    /// Create an echo client for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dial_timeout: DIAL_TIMEOUT,
        }
    }

    /// Echo endpoint from [`ECHO_URL_ENV`], or [`DEFAULT_ECHO_URL`]
    pub fn from_env() -> Self {
        Self::new(url_from(std::env::var(ECHO_URL_ENV).ok()))
    }

    /// Create with a custom connect timeout
    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    fn client_for(&self, route: ProbeRoute) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .local_address(Some(local_address(route)))
            .connect_timeout(self.dial_timeout)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))
    }
}

/// Pick the configured URL, ignoring empty values
fn url_from(configured: Option<String>) -> String {
    configured
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_ECHO_URL.to_string())
}

/// Source address a probe binds to
fn local_address(route: ProbeRoute) -> IpAddr {
    match route {
        ProbeRoute::Family(IpFamily::V4) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        ProbeRoute::Family(IpFamily::V6) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        ProbeRoute::LocalAddr(ip) => ip,
    }
}

/// Map a non-success status to an error
fn check_status(url: &str, status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    Err(match status.as_u16() {
        429 => Error::rate_limited(format!("{url} returned {status}")),
        404 => Error::not_found(format!("{url} returned {status}")),
        _ => Error::http(format!("{url} returned {status}")),
    })
}

#[async_trait::async_trait]
impl IpEcho for HttpIpEcho {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn probe(&self, route: ProbeRoute) -> Result<String> {
        let client = self.client_for(route)?;

        debug!(url = %self.url, local = %local_address(route), "probing IP echo endpoint");

        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::http(format!("request failed: {e}")))?;

        check_status(&self.url, response.status())?;

        response
            .text()
            .await
            .map_err(|e| Error::http(format!("failed to read response: {e}")))
    }
}

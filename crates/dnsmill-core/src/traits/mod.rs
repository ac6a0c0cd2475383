//! Core traits for dnsmill
//!
//! These are the seams between the core and the outside world:
//!
//! - [`DnsProvider`]: Submit records to a DNS hosting backend
//! - [`IpEcho`]: Probe an HTTP endpoint that echoes the caller's public IP
//! - [`InterfaceSource`] / [`HostnameLookup`]: Local address sources

pub mod dns_provider;
pub mod host_lookup;
pub mod ip_echo;

pub use dns_provider::{DnsProvider, DnsProviderFactory, Record, RecordType, ROOT_LABEL};
pub use host_lookup::{HostnameLookup, InterfaceSource};
pub use ip_echo::{IpEcho, ProbeRoute};

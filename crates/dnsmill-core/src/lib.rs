// # dnsmill-core
//
// Core library for dnsmill, a declarative DNS zone sync tool.
//
// ## Architecture Overview
//
// An operator writes a profile naming zones, the provider owning each zone,
// and per-domain record intents. This crate provides:
// - **Profile / Records / HostAddress**: the profile model and its
//   shape-based decoding (a value may be a string, an array or an object)
// - **map_zones**: assigns every record domain to exactly one zone
// - **HostResolver**: turns flagged host addresses into IPs (literal,
//   interface, external or hostname)
// - **ExternalIpDiscovery**: probes an IP echo endpoint per address family
//   or per local source address
// - **ApplyEngine**: converts and submits records zone by zone
// - **ProviderRegistry**: explicit registry of DNS provider factories
//
// ## Design Principles
//
// 1. **Validate first**: parse and mapping errors surface before any network I/O
// 2. **Best effort across zones**: one failing zone never blocks the others
// 3. **Plugin-Based**: providers and network transports plug in through traits
// 4. **Library-First**: the binaries only compose what this crate exports

pub mod config;
mod decode;
pub mod domain;
pub mod engine;
pub mod error;
pub mod host_address;
pub mod mapper;
pub mod profile;
pub mod records;
pub mod registry;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use config::{Config, DuplicatePolicy};
pub use domain::{Domain, Domains};
pub use engine::ApplyEngine;
pub use error::{Error, Result, ResultExt};
pub use host_address::{HostAddress, HostAddressFlag, HostAddressFlags, HostAddresses, IpFamily};
pub use mapper::{MappedZone, map_zones};
pub use profile::{Profile, ProfileFormat, ProviderConfig};
pub use records::Records;
pub use registry::ProviderRegistry;
pub use resolver::{ExternalIpDiscovery, HostResolver};
pub use traits::{
    DnsProvider, DnsProviderFactory, HostnameLookup, InterfaceSource, IpEcho, ProbeRoute, Record,
    RecordType,
};

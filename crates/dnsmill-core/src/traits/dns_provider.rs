// # DNS Provider Trait
//
// Defines the interface for submitting records to a DNS hosting backend.
//
// ## Implementations
//
// - Cloudflare: `dnsmill-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsmill_core::{DnsProvider, Record};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let record = Record::for_ip("www", "192.0.2.1".parse()?);
//     let committed = provider.append_records("example.com", &[record]).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

/// Label used for records at the zone apex
pub const ROOT_LABEL: &str = "@";

/// DNS record types dnsmill can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
        }
    }

    /// The address record type for `ip`. IPv4-mapped IPv6 addresses are A records.
    pub fn for_ip(ip: &IpAddr) -> Self {
        if ip.to_canonical().is_ipv4() {
            Self::A
        } else {
            Self::Aaaa
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider-agnostic record entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Backend-assigned identifier, set on committed records only
    pub id: Option<String>,
    /// Record type
    pub record_type: RecordType,
    /// Name relative to the zone, [`ROOT_LABEL`] for the apex
    pub name: String,
    /// Record data (an IP literal or a CNAME target)
    pub value: String,
}

impl Record {
    /// Create a record without an identifier
    pub fn new(record_type: RecordType, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: None,
            record_type,
            name: name.into(),
            value: value.into(),
        }
    }

    /// An A or AAAA record for `ip`
    pub fn for_ip(name: impl Into<String>, ip: IpAddr) -> Self {
        let ip = ip.to_canonical();
        Self::new(RecordType::for_ip(&ip), name, ip.to_string())
    }

    /// A CNAME record pointing at `target`
    pub fn cname(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(RecordType::Cname, name, target)
    }

    /// This record with a backend identifier attached
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Trait for DNS provider implementations
///
/// Implementations must be safe for concurrent use: the apply engine builds
/// one instance per provider and shares it across zones.
///
/// Providers perform a single submission per call. They do not retry and do
/// not decide whether a record needs to change; that belongs to the backend
/// API and to the duplicate policy chosen by the caller.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Add records to `zone`.
    ///
    /// Fails if a conflicting record already exists. Returns the committed
    /// records with their backend identifiers.
    async fn append_records(
        &self,
        zone: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, crate::Error>;

    /// Replace the records of `zone` sharing a name and type with `records`.
    ///
    /// Returns the resulting records with their backend identifiers.
    async fn set_records(
        &self,
        zone: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Constructs provider instances for the registry
#[async_trait]
pub trait DnsProviderFactory: Send + Sync {
    /// Name the provider is declared under in profiles
    fn name(&self) -> &'static str;

    /// Documentation URL for configuring this provider
    fn doc_url(&self) -> &'static str;

    /// Create a provider instance, reading credentials from the environment
    async fn create(&self) -> Result<Box<dyn DnsProvider>, crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_ip_picks_record_type() {
        let a = Record::for_ip("www", "10.0.0.1".parse().unwrap());
        assert_eq!(a.record_type, RecordType::A);
        assert_eq!(a.value, "10.0.0.1");

        let aaaa = Record::for_ip("@", "2001:db8::1".parse().unwrap());
        assert_eq!(aaaa.record_type, RecordType::Aaaa);
    }

    #[test]
    fn test_for_ip_unmaps_v4_mapped_addresses() {
        let record = Record::for_ip("@", "::ffff:192.0.2.7".parse().unwrap());
        assert_eq!(record.record_type, RecordType::A);
        assert_eq!(record.value, "192.0.2.7");
    }

    #[test]
    fn test_record_type_names() {
        assert_eq!(RecordType::A.to_string(), "A");
        assert_eq!(RecordType::Aaaa.to_string(), "AAAA");
        assert_eq!(RecordType::Cname.to_string(), "CNAME");
    }
}

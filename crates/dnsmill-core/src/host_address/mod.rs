//! Host address specifiers
//!
//! A host address describes how to derive IP addresses for an A/AAAA record.
//! Its text form is `[flag1[,flag2...]!]address`: flags before a literal `!`,
//! the address after it. Without a `!` the whole string is the address and
//! the type is inferred at resolution time.
//!
//! ```text
//! 203.0.113.5              inferred (ip, then interface, then hostname)
//! ip!203.0.113.5           literal IP
//! interface,ipv4!eth0      IPv4 addresses bound to eth0
//! interface,external!eth0  external IPs reachable through eth0
//! external,ipv6!           external IPv6 address of this machine
//! hostname!example.net     DNS lookup
//! ```

mod flags;

pub use flags::{FlagGroup, HostAddressFlag, HostAddressFlags, IpFamily};

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde_json::Value;

use crate::decode::{self, deserialize_via_value};
use crate::error::{Error, Result};

/// Parse an IP literal, the parser shared by every address source
pub fn parse_ip_literal(text: &str) -> Result<IpAddr> {
    text.parse()
        .map_err(|_| Error::InvalidIp(text.to_string()))
}

/// A host address with its flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAddress {
    pub address: String,
    pub flags: HostAddressFlags,
}

impl HostAddress {
    /// Create a validated host address
    pub fn new(address: impl Into<String>, flags: HostAddressFlags) -> Result<Self> {
        let addr = Self {
            address: address.into(),
            flags,
        };
        addr.validate()?;
        Ok(addr)
    }

    /// Parse the `[flags!]address` text form
    pub fn parse(text: &str) -> Result<Self> {
        let parsed = match text.split_once('!') {
            Some((flags, address)) => Self {
                address: address.to_string(),
                flags: HostAddressFlags::parse_list(flags)
                    .map_err(|err| err.context("invalid host address flags"))?,
            },
            None => Self {
                address: text.to_string(),
                flags: HostAddressFlags::default(),
            },
        };

        parsed
            .validate()
            .map_err(|err| err.context(format!("invalid HostAddress {text:?}")))?;
        Ok(parsed)
    }

    /// Check the flag rules and the empty-address rule of `external`
    pub fn validate(&self) -> Result<()> {
        self.flags
            .validate()
            .map_err(|err| err.context("invalid host address flags"))?;

        if self.flags.kind() == Some(HostAddressFlag::External) && !self.address.is_empty() {
            return Err(Error::ExternalWithAddress(self.address.clone()));
        }
        Ok(())
    }

    /// Decode from the text form or an `{address, flags}` object
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Object(object) => {
                decode::deny_unknown_keys(object, &["address", "flags"], "HostAddress")?;

                let address = match object.get("address") {
                    None | Some(Value::Null) => String::new(),
                    Some(value) => decode::string(value, "HostAddress address")?,
                };

                let flags = match object.get("flags") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| {
                            decode::string(item, "HostAddress flag")
                                .and_then(|flag| flag.parse::<HostAddressFlag>())
                        })
                        .collect::<Result<Vec<HostAddressFlag>>>()?,
                    Some(other) => {
                        return Err(Error::parse(format!(
                            "expected array for HostAddress flags, got {}",
                            decode::shape(other)
                        )));
                    }
                };

                let flags = HostAddressFlags::new(flags)
                    .map_err(|err| err.context(format!("invalid HostAddress {address:?}")))?;
                Self::new(address, flags)
            }
            other => Err(Error::parse(format!(
                "invalid HostAddress: expected string or object, got {}",
                decode::shape(other)
            ))),
        }
    }
}

impl FromStr for HostAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flags.is_empty() {
            f.write_str(&self.address)
        } else {
            write!(f, "{}!{}", self.flags, self.address)
        }
    }
}

deserialize_via_value!(HostAddress);

/// An ordered list of host addresses.
///
/// Decodes from a single address string or an array of addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAddresses(Vec<HostAddress>);

impl HostAddresses {
    pub fn new(addresses: Vec<HostAddress>) -> Self {
        Self(addresses)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HostAddress> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode from a string or an array
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(_) => HostAddress::from_value(value)
                .map(|addr| Self(vec![addr]))
                .map_err(|err| err.context("failed to parse HostAddresses string")),
            Value::Array(items) => items
                .iter()
                .map(HostAddress::from_value)
                .collect::<Result<Vec<_>>>()
                .map(Self)
                .map_err(|err| err.context("failed to parse HostAddresses array")),
            other => Err(Error::parse(format!(
                "invalid HostAddresses: expected string or array, got {}",
                decode::shape(other)
            ))),
        }
    }
}

impl<'a> IntoIterator for &'a HostAddresses {
    type Item = &'a HostAddress;
    type IntoIter = std::slice::Iter<'a, HostAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

deserialize_via_value!(HostAddresses);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_without_flags() {
        let addr = HostAddress::parse("203.0.113.5").unwrap();
        assert_eq!(addr.address, "203.0.113.5");
        assert!(addr.flags.is_empty());
    }

    #[test]
    fn test_parse_with_flags() {
        let addr = HostAddress::parse("interface,ipv6!eth0").unwrap();
        assert_eq!(addr.address, "eth0");
        assert_eq!(addr.flags.kind(), Some(HostAddressFlag::Interface));
        assert_eq!(addr.flags.family(), Some(IpFamily::V6));
    }

    #[test]
    fn test_parse_splits_on_first_bang() {
        let addr = HostAddress::parse("hostname!a!b").unwrap();
        assert_eq!(addr.address, "a!b");
    }

    #[test]
    fn test_parse_rejects_conflicting_flags() {
        let err = HostAddress::parse("ip,interface!eth0").unwrap_err();
        assert!(matches!(err.root_cause(), Error::ConflictingFlags { .. }));
    }

    #[test]
    fn test_parse_accepts_cross_group_flags() {
        assert!(HostAddress::parse("ipv4,hostname!example.net").is_ok());
    }

    #[test]
    fn test_external_requires_empty_address() {
        assert!(HostAddress::parse("external!").is_ok());
        assert!(HostAddress::parse("external,ipv4!").is_ok());

        let err = HostAddress::parse("external!1.2.3.4").unwrap_err();
        assert!(matches!(err.root_cause(), Error::ExternalWithAddress(_)));

        // external as an interface modifier names the interface
        assert!(HostAddress::parse("interface,external!eth0").is_ok());
    }

    #[test]
    fn test_render_round_trip() {
        for text in ["10.0.0.1", "ip!10.0.0.1", "interface,ipv4!eth0", "external,ipv6!"] {
            let addr = HostAddress::parse(text).unwrap();
            let reparsed = HostAddress::parse(&addr.to_string()).unwrap();
            assert_eq!(addr, reparsed);
        }
    }

    #[test]
    fn test_from_value_object() {
        let addr = HostAddress::from_value(&json!({
            "address": "eth0",
            "flags": ["interface", "ipv4"],
        }))
        .unwrap();
        assert_eq!(addr, HostAddress::parse("interface,ipv4!eth0").unwrap());

        let external = HostAddress::from_value(&json!({"flags": ["external"]})).unwrap();
        assert_eq!(external.address, "");
    }

    #[test]
    fn test_from_value_object_validates() {
        let err = HostAddress::from_value(&json!({"address": "x", "flags": ["ip", "hostname"]}))
            .unwrap_err();
        assert!(matches!(err.root_cause(), Error::ConflictingFlags { .. }));

        assert!(HostAddress::from_value(&json!({"address": "x", "port": 1})).is_err());
    }

    #[test]
    fn test_from_value_rejects_other_shapes() {
        let err = HostAddress::from_value(&json!(42)).unwrap_err();
        assert!(err.to_string().contains("expected string or object, got number"));
    }

    #[test]
    fn test_host_addresses_shapes() {
        let one = HostAddresses::from_value(&json!("10.0.0.1")).unwrap();
        assert_eq!(one.len(), 1);

        let many = HostAddresses::from_value(&json!(["10.0.0.1", {"address": "eth0", "flags": ["interface"]}]))
            .unwrap();
        assert_eq!(many.len(), 2);

        let err = HostAddresses::from_value(&json!({"address": "10.0.0.1"})).unwrap_err();
        assert!(err.to_string().contains("expected string or array, got object"));
    }

    #[test]
    fn test_parse_ip_literal() {
        assert_eq!(parse_ip_literal("::1").unwrap(), "::1".parse::<IpAddr>().unwrap());
        assert!(matches!(parse_ip_literal("eth0"), Err(Error::InvalidIp(_))));
    }
}

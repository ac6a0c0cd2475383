//! Host address flags and their exclusivity rules
//!
//! Flags belong to one of two groups. At most one flag per group may be set:
//!
//! | Group        | Flags                                      |
//! |--------------|--------------------------------------------|
//! | `type`       | `ip`, `interface`, `external`, `hostname`  |
//! | `ip-version` | `ipv4`, `ipv6`                             |
//!
//! The one permitted pair inside a group is `interface` + `external`, where
//! `external` acts as a modifier: the interface's addresses are used as
//! source addresses for external IP discovery.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A single host address flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HostAddressFlag {
    /// Parse the address as an IP literal
    Ip,
    /// Use the addresses bound to the named network interface
    Interface,
    /// Discover the externally visible IP (the address must be empty)
    External,
    /// Look the address up as a hostname
    Hostname,
    /// Restrict to IPv4
    Ipv4,
    /// Restrict to IPv6
    Ipv6,
}

/// Exclusivity group of a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagGroup {
    Type,
    IpVersion,
}

impl FlagGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::IpVersion => "ip-version",
        }
    }
}

impl fmt::Display for FlagGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HostAddressFlag {
    /// Every recognized flag
    pub const ALL: [Self; 6] = [
        Self::Ip,
        Self::Interface,
        Self::External,
        Self::Hostname,
        Self::Ipv4,
        Self::Ipv6,
    ];

    /// Type flags in dispatch order
    pub const TYPES: [Self; 4] = [Self::Ip, Self::Interface, Self::External, Self::Hostname];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Interface => "interface",
            Self::External => "external",
            Self::Hostname => "hostname",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }

    pub fn group(self) -> FlagGroup {
        match self {
            Self::Ip | Self::Interface | Self::External | Self::Hostname => FlagGroup::Type,
            Self::Ipv4 | Self::Ipv6 => FlagGroup::IpVersion,
        }
    }

    fn compatible_with(self, other: Self) -> bool {
        self == other
            || self.group() != other.group()
            || matches!(
                (self, other),
                (Self::Interface, Self::External) | (Self::External, Self::Interface)
            )
    }
}

impl fmt::Display for HostAddressFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostAddressFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| Error::UnknownFlag(s.to_string()))
    }
}

/// IP address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Whether `ip` belongs to this family
    pub fn matches(self, ip: &IpAddr) -> bool {
        match self {
            Self::V4 => ip.to_canonical().is_ipv4(),
            Self::V6 => !ip.to_canonical().is_ipv4(),
        }
    }

    /// Transport network name, as used in diagnostics
    pub fn network(self) -> &'static str {
        match self {
            Self::V4 => "tcp4",
            Self::V6 => "tcp6",
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.network())
    }
}

/// A validated set of host address flags, in the order they were written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAddressFlags(Vec<HostAddressFlag>);

impl HostAddressFlags {
    /// Build a flag set, rejecting mutually exclusive flags.
    ///
    /// Repeated flags are collapsed.
    pub fn new(flags: impl IntoIterator<Item = HostAddressFlag>) -> Result<Self> {
        let mut set = Self::default();
        for flag in flags {
            if !set.has(flag) {
                set.0.push(flag);
            }
        }
        set.validate()?;
        Ok(set)
    }

    /// Parse a comma separated flag list, e.g. `interface,ipv4`
    pub fn parse_list(list: &str) -> Result<Self> {
        let flags = list
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<HostAddressFlag>>>()?;
        Self::new(flags)
    }

    /// Check the exclusivity rules
    pub fn validate(&self) -> Result<()> {
        for (i, &first) in self.0.iter().enumerate() {
            if let Some(&second) = self.0[i + 1..]
                .iter()
                .find(|&&other| !first.compatible_with(other))
            {
                return Err(Error::ConflictingFlags {
                    first: first.to_string(),
                    second: second.to_string(),
                    group: first.group().as_str(),
                });
            }
        }
        Ok(())
    }

    pub fn has(&self, flag: HostAddressFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = HostAddressFlag> + '_ {
        self.0.iter().copied()
    }

    /// The address type to resolve as, in dispatch order
    pub fn kind(&self) -> Option<HostAddressFlag> {
        HostAddressFlag::TYPES.into_iter().find(|&flag| self.has(flag))
    }

    /// The ip-version restriction, if any
    pub fn family(&self) -> Option<IpFamily> {
        if self.has(HostAddressFlag::Ipv4) {
            Some(IpFamily::V4)
        } else if self.has(HostAddressFlag::Ipv6) {
            Some(IpFamily::V6)
        } else {
            None
        }
    }
}

impl fmt::Display for HostAddressFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, flag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{flag}")?;
        }
        Ok(())
    }
}

//! Domain names
//!
//! A [`Domain`] is an opaque, case-preserved DNS name. The only relation
//! dnsmill needs between names is [`Domain::subdomain_of`], which decides
//! which zone a record belongs to and what its label inside that zone is.

use std::borrow::Borrow;
use std::fmt;

use serde_json::Value;

use crate::decode::{self, deserialize_via_value};
use crate::error::{Error, Result};

/// A domain name, such as `example.com` or `app.example.com`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(String);

impl Domain {
    /// Create a domain from a name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The domain name as written in the profile
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label of this domain relative to `root`.
    ///
    /// Returns `Some("")` when both are equal, `Some(label)` when this domain
    /// is a strict subdomain of `root` on a label boundary, and `None`
    /// otherwise.
    pub fn subdomain_of(&self, root: &Domain) -> Option<&str> {
        if self == root {
            return Some("");
        }

        let label = self
            .0
            .strip_suffix(root.as_str())?
            .strip_suffix('.')?
            .trim_end_matches('.');

        if label.is_empty() { None } else { Some(label) }
    }

    fn from_value(value: &Value) -> Result<Self> {
        decode::string(value, "domain").map(Self)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Domain {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Domain {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for Domain {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An ordered list of domain names.
///
/// Decodes from either a single name or an array of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domains(Vec<Domain>);

impl Domains {
    /// Create a list of domains
    pub fn new(domains: Vec<Domain>) -> Self {
        Self(domains)
    }

    /// Iterate the domains in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, Domain> {
        self.0.iter()
    }

    /// Number of domains
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode from a string or an array of strings
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self(vec![Domain::new(name.as_str())])),
            Value::Array(items) => items
                .iter()
                .map(Domain::from_value)
                .collect::<Result<Vec<_>>>()
                .map(Self)
                .map_err(|err| err.context("failed to parse Domains array")),
            other => Err(Error::parse(format!(
                "invalid Domains: expected string or array, got {}",
                decode::shape(other)
            ))),
        }
    }
}

impl<'a> IntoIterator for &'a Domains {
    type Item = &'a Domain;
    type IntoIter = std::slice::Iter<'a, Domain>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Domain> for Domains {
    fn from_iter<I: IntoIterator<Item = Domain>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

deserialize_via_value!(Domains);

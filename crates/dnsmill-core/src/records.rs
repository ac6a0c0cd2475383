//! Per-domain record intents
//!
//! A profile maps each domain to a [`Records`] value, written as one of:
//!
//! ```yaml
//! example.com: 203.0.113.5                  # one host address
//! www.example.com: [10.0.0.1, 10.0.0.2]     # several host addresses
//! api.example.com: { hosts: external! }     # explicit hosts
//! blog.example.com: { cname: example.net }  # a CNAME
//! ```

use serde_json::Value;

use crate::decode::{self, deserialize_via_value};
use crate::error::{Error, Result};
use crate::host_address::HostAddresses;
use crate::resolver::HostResolver;
use crate::traits::{Record, ROOT_LABEL};

/// The records of one domain: either host addresses or a CNAME target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Records {
    /// Addresses resolved into A and AAAA records
    Hosts(HostAddresses),
    /// A single CNAME record
    Cname(String),
}

impl Records {
    /// Decode by shape: a string or array is a host list, an object names
    /// exactly one of `hosts` or `cname`
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(_) | Value::Array(_) => HostAddresses::from_value(value)
                .map(Self::Hosts)
                .map_err(|err| err.context("failed to parse records as HostAddresses")),
            Value::Object(object) => {
                decode::deny_unknown_keys(object, &["hosts", "cname"], "records")?;

                let hosts = object.get("hosts").filter(|v| !v.is_null());
                let cname = object.get("cname").filter(|v| !v.is_null());

                match (hosts, cname) {
                    (Some(_), Some(_)) => Err(Error::parse(
                        "expected either hosts or cname field, not both",
                    )),
                    (Some(hosts), None) => HostAddresses::from_value(hosts)
                        .map(Self::Hosts)
                        .map_err(|err| err.context("failed to parse records hosts")),
                    (None, Some(cname)) => {
                        let target = decode::string(cname, "cname")?;
                        if target.is_empty() {
                            return Err(Error::parse("cname target must not be empty"));
                        }
                        Ok(Self::Cname(target))
                    }
                    (None, None) => Err(Error::parse("expected either hosts or cname field")),
                }
            }
            other => Err(Error::parse(format!(
                "invalid Records: expected string, array, or object, got {}",
                decode::shape(other)
            ))),
        }
    }

    /// Convert into provider-agnostic records named `label` inside their zone.
    ///
    /// An empty label is the zone apex. Host addresses are resolved with
    /// `resolver`; any failure aborts the whole conversion.
    pub async fn convert(&self, resolver: &HostResolver, label: &str) -> Result<Vec<Record>> {
        let name = if label.is_empty() { ROOT_LABEL } else { label };

        match self {
            Self::Hosts(hosts) => {
                let ips = resolver
                    .resolve_all(hosts)
                    .await
                    .map_err(|err| err.context("failed to resolve hosts"))?;
                Ok(ips.into_iter().map(|ip| Record::for_ip(name, ip)).collect())
            }
            Self::Cname(target) => Ok(vec![Record::cname(name, target.as_str())]),
        }
    }
}

deserialize_via_value!(Records);

//! Profiles
//!
//! A profile is the root document: behaviour `config`, the `providers` and
//! the zones they own, and the per-domain `records`.
//!
//! Two top-level shapes are accepted. The closed form nests records under a
//! `records` key and allows nothing else beside `config` and `providers`:
//!
//! ```yaml
//! providers:
//!   cloudflare: [example.com]
//! records:
//!   example.com: 203.0.113.5
//! ```
//!
//! Without a `records` key, every other top-level key is a domain:
//!
//! ```yaml
//! providers:
//!   cloudflare: [example.com]
//! example.com: 203.0.113.5
//! www.example.com: { cname: example.com }
//! ```

mod load;

pub use load::ProfileFormat;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::Config;
use crate::decode::{self, deserialize_via_value};
use crate::domain::{Domain, Domains};
use crate::error::{Error, Result, ResultExt};
use crate::mapper;
use crate::records::Records;
use crate::registry::ProviderRegistry;

/// Top-level keys with a fixed meaning
const CONFIG_KEY: &str = "config";
const PROVIDERS_KEY: &str = "providers";
const RECORDS_KEY: &str = "records";

/// Configuration of one provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Zones this provider is authoritative for
    pub zones: Domains,
}

impl ProviderConfig {
    /// Decode from a bare zone list or a `{domains: [...]}` object
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(_) => Domains::from_value(value).map(|zones| Self { zones }),
            Value::Object(object) => {
                decode::deny_unknown_keys(object, &["domains"], "provider config")?;
                let zones = match object.get("domains") {
                    None | Some(Value::Null) => Domains::default(),
                    Some(domains) => Domains::from_value(domains)?,
                };
                Ok(Self { zones })
            }
            other => Err(Error::parse(format!(
                "invalid ProviderConfig: expected array or object, got {}",
                decode::shape(other)
            ))),
        }
    }
}

deserialize_via_value!(ProviderConfig);

/// A parsed profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub config: Config,
    pub providers: BTreeMap<String, ProviderConfig>,
    pub records: BTreeMap<Domain, Records>,
}

impl Profile {
    /// Decode a profile document without validating it
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(object) = value else {
            return Err(Error::parse(format!(
                "expected object for profile, got {}",
                decode::shape(value)
            )));
        };

        let config = match object.get(CONFIG_KEY) {
            None | Some(Value::Null) => Config::default(),
            Some(config) => {
                Config::from_value(config).with_context(|| "failed to parse profile config")?
            }
        };

        let providers = match object.get(PROVIDERS_KEY) {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(providers) => {
                Self::providers_from_value(providers).with_context(|| "failed to parse providers")?
            }
        };

        let records = match object.get(RECORDS_KEY) {
            // closed form: nothing else may sit next to `records`
            Some(records) => {
                decode::deny_unknown_keys(object, &[CONFIG_KEY, PROVIDERS_KEY, RECORDS_KEY], "profile")?;
                let Value::Object(records) = records else {
                    return Err(Error::parse(format!(
                        "expected object for records, got {}",
                        decode::shape(records)
                    )));
                };
                Self::records_from_map(records.iter())?
            }
            None => Self::records_from_map(
                object
                    .iter()
                    .filter(|(key, _)| !matches!(key.as_str(), CONFIG_KEY | PROVIDERS_KEY)),
            )?,
        };

        Ok(Self {
            config,
            providers,
            records,
        })
    }

    fn providers_from_value(value: &Value) -> Result<BTreeMap<String, ProviderConfig>> {
        let Value::Object(providers) = value else {
            return Err(Error::parse(format!(
                "expected object for providers, got {}",
                decode::shape(value)
            )));
        };

        providers
            .iter()
            .map(|(name, config)| {
                ProviderConfig::from_value(config)
                    .map(|config| (name.clone(), config))
                    .with_context(|| format!("failed to parse provider {name:?}"))
            })
            .collect()
    }

    fn records_from_map<'a>(
        entries: impl Iterator<Item = (&'a String, &'a Value)>,
    ) -> Result<BTreeMap<Domain, Records>> {
        entries
            .map(|(domain, records)| {
                Records::from_value(records)
                    .map(|records| (Domain::new(domain.as_str()), records))
                    .with_context(|| format!("failed to parse domain {domain}"))
            })
            .collect()
    }

    /// Check zone ownership: no zone claimed twice, every record domain
    /// inside exactly one zone
    pub fn validate(&self) -> Result<()> {
        mapper::map_zones(self).map(|_| ())
    }

    /// Check that every provider named in the profile is registered
    pub fn validate_providers(&self, registry: &ProviderRegistry) -> Result<()> {
        let unknown = self
            .providers
            .keys()
            .filter(|name| !registry.contains(name))
            .map(|name| Error::UnknownProvider(name.clone()))
            .collect();

        match Error::join(unknown) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

deserialize_via_value!(Profile);

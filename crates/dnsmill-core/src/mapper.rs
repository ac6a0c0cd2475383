//! Domain to zone mapping
//!
//! Groups the records of a profile under the zone that owns them. The
//! mapping is rebuilt on every call and never cached.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::profile::Profile;
use crate::records::Records;

/// A zone with the records rooted at it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedZone {
    /// The zone apex
    pub root: Domain,
    /// Name of the provider owning the zone
    pub provider: String,
    /// Records by their full domain name, not the label
    pub subdomains: BTreeMap<Domain, Records>,
}

/// Map every record domain of `profile` to its owning zone.
///
/// Zones come back sorted by name.
///
/// # Errors
///
/// - [`Error::ZoneConflict`] when two providers declare the same zone
/// - [`Error::UnownedDomain`] when no zone covers a record domain
/// - [`Error::AmbiguousDomain`] when several zones cover it
pub fn map_zones(profile: &Profile) -> Result<Vec<MappedZone>> {
    let mut zones: Vec<MappedZone> = Vec::new();

    for (provider, config) in &profile.providers {
        for root in &config.zones {
            match zones.iter().find(|zone| &zone.root == root) {
                Some(zone) if zone.provider == *provider => {
                    debug!(provider = %provider, zone = %root, "zone declared twice by the same provider");
                }
                Some(_) => return Err(Error::ZoneConflict(root.to_string())),
                None => zones.push(MappedZone {
                    root: root.clone(),
                    provider: provider.clone(),
                    subdomains: BTreeMap::new(),
                }),
            }
        }
    }

    for (domain, records) in &profile.records {
        let owners: Vec<usize> = zones
            .iter()
            .enumerate()
            .filter(|(_, zone)| domain.subdomain_of(&zone.root).is_some())
            .map(|(i, _)| i)
            .collect();

        match owners.as_slice() {
            [] => return Err(Error::UnownedDomain(domain.to_string())),
            [owner] => {
                zones[*owner]
                    .subdomains
                    .insert(domain.clone(), records.clone());
            }
            several => {
                return Err(Error::AmbiguousDomain {
                    domain: domain.to_string(),
                    zones: several.iter().map(|&i| zones[i].root.to_string()).collect(),
                });
            }
        }
    }

    zones.sort_by(|a, b| a.root.cmp(&b.root));
    Ok(zones)
}

//! Apply engine
//!
//! The ApplyEngine is responsible for:
//! - Mapping profile records onto their zones
//! - Creating one provider instance per declared provider
//! - Converting each zone's records into provider-agnostic entries
//! - Submitting them under the configured duplicate policy
//!
//! ## Flow
//!
//! ```text
//! Profile ──map_zones──► MappedZone ─┬─► convert_zone ──► Vec<Record>
//!                                    │        │
//!                                    │        └── HostResolver (ip/interface/external/hostname)
//!                                    │
//!                                    └─► DnsProvider::append_records   (policy = error)
//!                                        DnsProvider::set_records      (policy = overwrite)
//! ```
//!
//! Zones are independent units of work. A failing zone is logged and
//! recorded, and the engine moves on to the next one; the failures are
//! joined into one error at the end. Nothing applied to earlier zones is
//! rolled back.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::DuplicatePolicy;
use crate::error::{Error, Result, ResultExt};
use crate::mapper::{MappedZone, map_zones};
use crate::profile::Profile;
use crate::registry::ProviderRegistry;
use crate::resolver::HostResolver;
use crate::traits::{DnsProvider, Record};

/// Applies profiles to DNS providers
pub struct ApplyEngine {
    registry: Arc<ProviderRegistry>,
    resolver: HostResolver,
}

impl ApplyEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `registry`: Factories for every provider a profile may name
    /// - `resolver`: Resolver for host addresses
    pub fn new(registry: Arc<ProviderRegistry>, resolver: HostResolver) -> Self {
        Self { registry, resolver }
    }

    /// Apply `profile`, zone by zone.
    ///
    /// With `dry_run` the records are converted and logged but not
    /// submitted. Validation and provider construction failures abort the
    /// run before any zone is touched; zone failures do not.
    pub async fn apply(&self, profile: &Profile, dry_run: bool) -> Result<()> {
        let zones = map_zones(profile).with_context(|| "failed to validate profile")?;

        let mut providers: HashMap<&str, Box<dyn DnsProvider>> =
            HashMap::with_capacity(profile.providers.len());
        for name in profile.providers.keys() {
            let provider = self
                .registry
                .create(name)
                .await
                .with_context(|| format!("failed to create provider {name:?}"))?;
            providers.insert(name.as_str(), provider);
        }

        let policy = profile.config.duplicate_policy;
        let mut errors = Vec::new();

        for zone in &zones {
            if zone.subdomains.is_empty() {
                debug!(provider = %zone.provider, zone = %zone.root, "no records for zone, skipping");
                continue;
            }

            let result = match providers.get(zone.provider.as_str()) {
                Some(provider) => self.apply_zone(zone, provider.as_ref(), policy, dry_run).await,
                None => Err(Error::UnknownProvider(zone.provider.clone())),
            };

            if let Err(err) = result {
                error!(provider = %zone.provider, zone = %zone.root, error = %err, "cannot apply zone");
                errors.push(err.context(format!(
                    "provider {:?}, zone {:?}",
                    zone.provider,
                    zone.root.as_str()
                )));
            }
        }

        match Error::join(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Convert the records of one zone into provider-agnostic entries,
    /// resolving host addresses on the way
    pub async fn convert_zone(&self, zone: &MappedZone) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(zone.subdomains.len());

        for (domain, intent) in &zone.subdomains {
            let label = domain.subdomain_of(&zone.root).ok_or_else(|| {
                Error::parse(format!("{:?} is not a subdomain of {:?}", domain.as_str(), zone.root.as_str()))
            })?;

            let converted = intent
                .convert(&self.resolver, label)
                .await
                .with_context(|| format!("failed to convert records for {:?}", domain.as_str()))?;
            records.extend(converted);
        }

        Ok(records)
    }

    async fn apply_zone(
        &self,
        zone: &MappedZone,
        provider: &dyn DnsProvider,
        policy: DuplicatePolicy,
        dry_run: bool,
    ) -> Result<()> {
        let records = self.convert_zone(zone).await?;

        for record in &records {
            info!(
                provider = %zone.provider,
                zone = %zone.root,
                "record.type" = %record.record_type,
                record.name = %record.name,
                record.value = %record.value,
                "applying fresh record"
            );
        }

        if dry_run {
            debug!(provider = %zone.provider, zone = %zone.root, "dry run enabled, skipping submission");
            return Ok(());
        }

        let committed = match policy {
            DuplicatePolicy::Error => provider.append_records(zone.root.as_str(), &records).await,
            DuplicatePolicy::Overwrite => provider.set_records(zone.root.as_str(), &records).await,
        }
        .with_context(|| format!("failed to apply records for {:?}", zone.root.as_str()))?;

        for record in &committed {
            info!(
                provider = %zone.provider,
                zone = %zone.root,
                record.id = record.id.as_deref().unwrap_or_default(),
                "record.type" = %record.record_type,
                record.name = %record.name,
                record.value = %record.value,
                "applied record"
            );
        }

        Ok(())
    }
}

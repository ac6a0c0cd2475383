//! Plugin-based provider registry
//!
//! The registry maps provider names, as written in profiles, to factories.
//! The entry point builds it once at startup and hands it to the apply
//! engine; it is read-only afterwards.
//!
//! ## Registration
//!
//! Provider crates expose an explicit registration function:
//!
//! ```rust,ignore
//! // In dnsmill-provider-cloudflare
//! pub fn register(registry: &mut ProviderRegistry) -> dnsmill_core::Result<()> {
//!     registry.register(Box::new(CloudflareFactory))
//! }
//! ```

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsProviderFactory};

/// Provider registry for plugin-based DNS provider creation
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories, by name
    providers: BTreeMap<String, Box<dyn DnsProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory under its own name
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateProvider`] if the name is already taken.
    pub fn register(&mut self, factory: Box<dyn DnsProviderFactory>) -> Result<()> {
        let name = factory.name();
        if self.providers.contains_key(name) {
            return Err(Error::DuplicateProvider(name.to_string()));
        }
        self.providers.insert(name.to_string(), factory);
        Ok(())
    }

    /// Look up a factory by name
    pub fn get(&self, name: &str) -> Result<&dyn DnsProviderFactory> {
        self.providers
            .get(name)
            .map(|factory| &**factory)
            .ok_or_else(|| Error::UnknownProvider(name.to_string()))
    }

    /// Whether a provider of this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// All registered factories, sorted by name
    pub fn list(&self) -> impl Iterator<Item = &dyn DnsProviderFactory> {
        self.providers.values().map(|factory| &**factory)
    }

    /// Create a provider instance by name
    pub async fn create(&self, name: &str) -> Result<Box<dyn DnsProvider>> {
        self.get(name)?.create().await
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

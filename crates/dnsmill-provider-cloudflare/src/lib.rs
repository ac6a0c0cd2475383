// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for dnsmill.
//
// ## Behaviour
//
// - `append_records` creates one record per entry and fails on the first
//   rejection (Cloudflare refuses exact duplicates)
// - `set_records` converges every (type, name) group: matching records are
//   kept, stale ones deleted and missing ones created
// - No retries and no caching beyond a single call
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - API token MUST be provided via the `CLOUDFLARE_API_TOKEN` environment variable
// - Provider construction fails if the token is missing or empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dnsmill_core::traits::{DnsProvider, DnsProviderFactory, ROOT_LABEL, Record};
use dnsmill_core::{Error, ProviderRegistry, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

/// Registry name of this provider
pub const PROVIDER_NAME: &str = "cloudflare";

/// Environment variable holding the API token
pub const API_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Response envelope shared by every API v4 endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

/// A DNS record as returned by the API
#[derive(Debug, Clone, Deserialize)]
struct DnsRecord {
    id: String,
    content: String,
}

/// Cloudflare DNS provider
///
/// Stateless apart from its HTTP client: the zone id is looked up on every
/// call.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Errors
    ///
    /// - [`Error::MissingCredential`] if the token is empty
    /// - [`Error::Http`] if the HTTP client cannot be built
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::MissingCredential(API_TOKEN_ENV.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_token,
            api_base: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the provider at another API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Send a request and unwrap the response envelope
    async fn call<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<Option<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(status_error(status, &api_errors(&body)));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("failed to parse response: {e}")))?;

        if !envelope.success {
            return Err(Error::provider(PROVIDER_NAME, join_messages(&envelope.errors)));
        }

        Ok(envelope.result)
    }

    /// Get the zone ID of `zone`
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn zone_id(&self, zone: &str) -> Result<String> {
        tracing::debug!(zone, "looking up Cloudflare zone id");

        let request = self
            .client
            .get(format!("{}/zones", self.api_base))
            .query(&[("name", zone)]);

        let zones: Vec<Zone> = self.call(request).await?.unwrap_or_default();
        zones
            .into_iter()
            .next()
            .map(|zone| zone.id)
            .ok_or_else(|| Error::not_found(format!("zone {zone:?}")))
    }

    async fn list_records(&self, zone_id: &str, record_type: &str, name: &str) -> Result<Vec<DnsRecord>> {
        let request = self
            .client
            .get(format!("{}/zones/{zone_id}/dns_records", self.api_base))
            .query(&[("type", record_type), ("name", name)]);

        Ok(self.call(request).await?.unwrap_or_default())
    }

    async fn create_record(&self, zone_id: &str, zone: &str, record: &Record) -> Result<Record> {
        let payload = serde_json::json!({
            "type": record.record_type.as_str(),
            "name": absolute_name(&record.name, zone),
            "content": record.value,
            "ttl": 1,
            "proxied": false,
        });

        let request = self
            .client
            .post(format!("{}/zones/{zone_id}/dns_records", self.api_base))
            .json(&payload);

        let created: DnsRecord = self
            .call(request)
            .await?
            .ok_or_else(|| Error::provider(PROVIDER_NAME, "create response has no result"))?;

        Ok(record.clone().with_id(created.id))
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let request = self
            .client
            .delete(format!("{}/zones/{zone_id}/dns_records/{record_id}", self.api_base));

        self.call::<serde_json::Value>(request).await?;
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn append_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        let zone_id = self.zone_id(zone).await?;

        let mut created = Vec::with_capacity(records.len());
        for record in records {
            created.push(self.create_record(&zone_id, zone, record).await?);
        }
        Ok(created)
    }

    async fn set_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        let zone_id = self.zone_id(zone).await?;

        let mut result = Vec::with_capacity(records.len());
        for ((record_type, name), wanted) in group_records(records) {
            let existing = self
                .list_records(&zone_id, record_type.as_str(), &absolute_name(name, zone))
                .await?;
            let plan = plan_group(&wanted, existing);

            for stale in &plan.delete {
                tracing::debug!(zone, record.id = %stale.id, "deleting stale record");
                self.delete_record(&zone_id, &stale.id).await?;
            }
            result.extend(plan.keep);
            for record in plan.create {
                result.push(self.create_record(&zone_id, zone, record).await?);
            }
        }
        Ok(result)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Absolute record name for the API: `@` is the zone itself
fn absolute_name(name: &str, zone: &str) -> String {
    if name.is_empty() || name == ROOT_LABEL {
        zone.to_string()
    } else {
        format!("{name}.{zone}")
    }
}

/// Group records by (type, name), keeping submission order inside a group
fn group_records(records: &[Record]) -> BTreeMap<(dnsmill_core::RecordType, &str), Vec<&Record>> {
    let mut groups: BTreeMap<_, Vec<&Record>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.record_type, record.name.as_str()))
            .or_default()
            .push(record);
    }
    groups
}

/// Changes converging one (type, name) group
#[derive(Debug)]
struct GroupPlan<'a> {
    keep: Vec<Record>,
    delete: Vec<DnsRecord>,
    create: Vec<&'a Record>,
}

fn plan_group<'a>(wanted: &[&'a Record], existing: Vec<DnsRecord>) -> GroupPlan<'a> {
    let mut plan = GroupPlan {
        keep: Vec::new(),
        delete: Vec::new(),
        create: Vec::new(),
    };
    let mut matched = vec![false; wanted.len()];

    for current in existing {
        let slot = (0..wanted.len()).find(|&i| !matched[i] && wanted[i].value == current.content);
        match slot {
            Some(i) => {
                matched[i] = true;
                plan.keep.push((*wanted[i]).clone().with_id(current.id));
            }
            None => plan.delete.push(current),
        }
    }

    plan.create = wanted
        .iter()
        .zip(&matched)
        .filter(|(_, matched)| !**matched)
        .map(|(record, _)| *record)
        .collect();
    plan
}

/// Error messages of a failed response body, if it is an API envelope
fn api_errors(body: &str) -> String {
    match serde_json::from_str::<Envelope<serde_json::Value>>(body) {
        Ok(envelope) if !envelope.errors.is_empty() => join_messages(&envelope.errors),
        _ => body.trim().to_string(),
    }
}

fn join_messages(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "request failed without error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{} (code {})", e.message, e.code))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Map an HTTP status to an error
fn status_error(status: reqwest::StatusCode, detail: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "invalid API token or insufficient permissions ({status}): {detail}"
        )),
        404 => Error::not_found(format!("{status}: {detail}")),
        409 => Error::provider(PROVIDER_NAME, format!("conflicting record ({status}): {detail}")),
        429 => Error::rate_limited(format!("{status}: {detail}")),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("Cloudflare server error (transient): {status} - {detail}"),
        ),
        _ => Error::provider(PROVIDER_NAME, format!("request failed: {status} - {detail}")),
    }
}

/// Factory for creating Cloudflare providers from the environment
#[derive(Debug, Default)]
pub struct CloudflareFactory;

#[async_trait]
impl DnsProviderFactory for CloudflareFactory {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn doc_url(&self) -> &'static str {
        "https://developers.cloudflare.com/fundamentals/api/get-started/create-token/"
    }

    async fn create(&self) -> Result<Box<dyn DnsProvider>> {
        let token = std::env::var(API_TOKEN_ENV).unwrap_or_default();
        Ok(Box::new(CloudflareProvider::new(token)?))
    }
}

/// Register the Cloudflare provider with a registry
///
/// # Example
///
/// ```rust
/// use dnsmill_core::ProviderRegistry;
///
/// let mut registry = ProviderRegistry::new();
/// dnsmill_provider_cloudflare::register(&mut registry).unwrap();
/// assert!(registry.contains("cloudflare"));
/// ```
pub fn register(registry: &mut ProviderRegistry) -> Result<()> {
    registry.register(Box::new(CloudflareFactory))
}

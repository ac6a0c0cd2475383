//! Test doubles and common utilities for contract tests
//!
//! Every network seam of the core has a fake here, so no contract test
//! touches the network.

#![allow(dead_code)]

use dnsmill_core::error::{Error, Result};
use dnsmill_core::traits::{
    DnsProvider, DnsProviderFactory, HostnameLookup, InterfaceSource, IpEcho, ProbeRoute, Record,
};
use dnsmill_core::{ExternalIpDiscovery, HostResolver, IpFamily, ProviderRegistry};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Which submission a provider received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Append,
    Set,
}

/// One recorded provider call
#[derive(Debug, Clone)]
pub struct Call {
    pub submission: Submission,
    pub zone: String,
    pub records: Vec<Record>,
}

/// Shared log of provider calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }
}

/// A provider that records every submission and commits it with fake ids
pub struct RecordingProvider {
    log: CallLog,
    failing_zones: HashSet<String>,
}

impl RecordingProvider {
    fn submit(&self, submission: Submission, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        self.log.push(Call {
            submission,
            zone: zone.to_string(),
            records: records.to_vec(),
        });

        if self.failing_zones.contains(zone) {
            return Err(Error::provider("recording", format!("zone {zone} rejected")));
        }

        Ok(records
            .iter()
            .enumerate()
            .map(|(i, record)| record.clone().with_id(format!("{zone}-{i}")))
            .collect())
    }
}

#[async_trait::async_trait]
impl DnsProvider for RecordingProvider {
    async fn append_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        self.submit(Submission::Append, zone, records)
    }

    async fn set_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        self.submit(Submission::Set, zone, records)
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Factory for [`RecordingProvider`]s sharing one call log
pub struct RecordingFactory {
    pub name: &'static str,
    pub log: CallLog,
    pub failing_zones: HashSet<String>,
    pub missing_credential: bool,
    pub created: Arc<AtomicUsize>,
}

impl RecordingFactory {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            log: CallLog::default(),
            failing_zones: HashSet::new(),
            missing_credential: false,
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_zone(mut self, zone: &str) -> Self {
        self.failing_zones.insert(zone.to_string());
        self
    }

    pub fn without_credential(mut self) -> Self {
        self.missing_credential = true;
        self
    }
}

#[async_trait::async_trait]
impl DnsProviderFactory for RecordingFactory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn doc_url(&self) -> &'static str {
        "https://dnsmill.test/providers/recording"
    }

    async fn create(&self) -> Result<Box<dyn DnsProvider>> {
        if self.missing_credential {
            return Err(Error::MissingCredential("RECORDING_API_TOKEN".to_string()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingProvider {
            log: self.log.clone(),
            failing_zones: self.failing_zones.clone(),
        }))
    }
}

/// An interface table
#[derive(Default)]
pub struct FakeInterfaces(pub HashMap<String, Vec<IpAddr>>);

impl FakeInterfaces {
    pub fn with(mut self, name: &str, addrs: &[&str]) -> Self {
        self.0.insert(name.to_string(), ips(addrs));
        self
    }
}

impl InterfaceSource for FakeInterfaces {
    fn addresses(&self, name: &str) -> Result<Vec<IpAddr>> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| Error::interface(name, "no such network interface"))
    }
}

/// A hostname table that counts lookups
#[derive(Default)]
pub struct FakeHostnames {
    table: HashMap<String, Vec<IpAddr>>,
    pub lookups: AtomicUsize,
}

impl FakeHostnames {
    pub fn with(mut self, host: &str, addrs: &[&str]) -> Self {
        self.table.insert(host.to_string(), ips(addrs));
        self
    }
}

#[async_trait::async_trait]
impl HostnameLookup for FakeHostnames {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.table
            .get(host)
            .cloned()
            .ok_or_else(|| Error::hostname(host, "no such host"))
    }
}

/// An IP echo endpoint answering from a table; unknown routes fail
#[derive(Default)]
pub struct FakeEcho {
    answers: HashMap<ProbeRoute, String>,
    pub probes: AtomicUsize,
}

impl FakeEcho {
    pub fn family(mut self, family: IpFamily, body: &str) -> Self {
        self.answers.insert(ProbeRoute::Family(family), body.to_string());
        self
    }

    pub fn local(mut self, local: &str, body: &str) -> Self {
        self.answers
            .insert(ProbeRoute::LocalAddr(local.parse().unwrap()), body.to_string());
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpEcho for FakeEcho {
    fn endpoint(&self) -> &str {
        "https://echo.dnsmill.test/ip"
    }

    async fn probe(&self, route: ProbeRoute) -> Result<String> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(&route)
            .cloned()
            .ok_or_else(|| Error::http("connection refused"))
    }
}

/// Network fakes wired into a resolver
pub struct FakeNetwork {
    pub interfaces: Arc<FakeInterfaces>,
    pub hostnames: Arc<FakeHostnames>,
    pub echo: Arc<FakeEcho>,
}

impl FakeNetwork {
    pub fn new(interfaces: FakeInterfaces, hostnames: FakeHostnames, echo: FakeEcho) -> Self {
        Self {
            interfaces: Arc::new(interfaces),
            hostnames: Arc::new(hostnames),
            echo: Arc::new(echo),
        }
    }

    /// A network with nothing on it
    pub fn empty() -> Self {
        Self::new(FakeInterfaces::default(), FakeHostnames::default(), FakeEcho::default())
    }

    pub fn resolver(&self) -> HostResolver {
        HostResolver::new(
            self.interfaces.clone(),
            self.hostnames.clone(),
            ExternalIpDiscovery::new(self.echo.clone()),
        )
    }

    /// Lookups and probes performed so far
    pub fn io_count(&self) -> usize {
        self.hostnames.lookups.load(Ordering::SeqCst) + self.echo.probe_count()
    }
}

/// A registry holding the given factories
pub fn registry(factories: Vec<RecordingFactory>) -> Arc<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    for factory in factories {
        registry.register(Box::new(factory)).unwrap();
    }
    Arc::new(registry)
}

pub fn ip(text: &str) -> IpAddr {
    text.parse().unwrap()
}

pub fn ips(list: &[&str]) -> Vec<IpAddr> {
    list.iter().map(|text| ip(text)).collect()
}

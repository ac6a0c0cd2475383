//! Contract Test: Apply Orchestration
//!
//! This test verifies how the apply engine drives providers.
//!
//! Constraints verified:
//! - Records are converted per zone with `@` for the zone apex
//! - The duplicate policy picks append or set submission
//! - A failing zone never blocks its siblings
//! - Validation and provider construction failures abort before any I/O
//!
//! If this test fails, profiles are applied incorrectly.

mod common;

use common::*;
use dnsmill_core::{ApplyEngine, Error, Profile, Record, RecordType, map_zones};
use serde_json::json;

fn profile(value: serde_json::Value) -> Profile {
    let profile = Profile::from_value(&value).unwrap();
    profile.validate().unwrap();
    profile
}

#[tokio::test]
async fn root_record_is_appended_under_error_policy() {
    let factory = RecordingFactory::new("p1");
    let log = factory.log.clone();
    let engine = ApplyEngine::new(registry(vec![factory]), FakeNetwork::empty().resolver());

    let profile = profile(json!({
        "providers": {"p1": ["example.com"]},
        "records": {"example.com": "10.0.0.1"},
    }));

    let zones = map_zones(&profile).unwrap();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].provider, "p1");

    engine.apply(&profile, false).await.unwrap();

    let calls = log.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].submission, Submission::Append);
    assert_eq!(calls[0].zone, "example.com");
    assert_eq!(calls[0].records, vec![Record::new(RecordType::A, "@", "10.0.0.1")]);
}

#[tokio::test]
async fn subdomain_hosts_become_labelled_records() {
    let factory = RecordingFactory::new("p1");
    let log = factory.log.clone();
    let engine = ApplyEngine::new(registry(vec![factory]), FakeNetwork::empty().resolver());

    let profile = profile(json!({
        "providers": {"p1": ["example.com"]},
        "records": {"www.example.com": ["10.0.0.1", "10.0.0.2"]},
    }));

    engine.apply(&profile, false).await.unwrap();

    let calls = log.calls();
    assert_eq!(
        calls[0].records,
        vec![
            Record::new(RecordType::A, "www", "10.0.0.1"),
            Record::new(RecordType::A, "www", "10.0.0.2"),
        ]
    );
}

#[tokio::test]
async fn overwrite_policy_uses_set_submission() {
    let factory = RecordingFactory::new("p1");
    let log = factory.log.clone();
    let engine = ApplyEngine::new(registry(vec![factory]), FakeNetwork::empty().resolver());

    let profile = profile(json!({
        "config": {"duplicatePolicy": "overwrite"},
        "providers": {"p1": ["example.com"]},
        "example.com": "2001:db8::1",
        "blog.example.com": {"cname": "example.com"},
    }));

    engine.apply(&profile, false).await.unwrap();

    let calls = log.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].submission, Submission::Set);
    assert_eq!(
        calls[0].records,
        vec![
            Record::new(RecordType::Aaaa, "@", "2001:db8::1"),
            Record::new(RecordType::Cname, "blog", "example.com"),
        ]
    );
}

#[tokio::test]
async fn dry_run_converts_without_submitting() {
    let factory = RecordingFactory::new("p1");
    let log = factory.log.clone();
    let created = factory.created.clone();
    let engine = ApplyEngine::new(registry(vec![factory]), FakeNetwork::empty().resolver());

    let profile = profile(json!({
        "providers": {"p1": ["example.com"]},
        "records": {"example.com": "10.0.0.1"},
    }));

    engine.apply(&profile, true).await.unwrap();

    assert!(log.calls().is_empty());
    assert_eq!(created.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dry_run_still_reports_resolution_failures() {
    let engine = ApplyEngine::new(
        registry(vec![RecordingFactory::new("p1")]),
        FakeNetwork::empty().resolver(),
    );

    let profile = profile(json!({
        "providers": {"p1": ["example.com"]},
        "records": {"example.com": "interface!eth0"},
    }));

    let err = engine.apply(&profile, true).await.unwrap_err();
    assert!(matches!(err.root_cause(), Error::Interface { .. }));
}

#[tokio::test]
async fn failing_zone_does_not_block_sibling_zone() {
    let factory = RecordingFactory::new("p1");
    let log = factory.log.clone();
    let engine = ApplyEngine::new(registry(vec![factory]), FakeNetwork::empty().resolver());

    let profile = profile(json!({
        "providers": {"p1": ["example.com", "example.net"]},
        "records": {
            "example.com": "interface!eth0",
            "example.net": "10.0.0.1",
        },
    }));

    let err = engine.apply(&profile, false).await.unwrap_err();

    assert_eq!(err.errors().len(), 1);
    assert!(matches!(err.root_cause(), Error::Interface { .. }));
    assert!(err.to_string().contains("zone \"example.com\""));
    assert!(err.to_string().contains("failed to resolve address \"interface!eth0\""));

    let calls = log.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].zone, "example.net");
}

#[tokio::test]
async fn provider_failures_are_joined_per_zone() {
    let p1 = RecordingFactory::new("p1").failing_zone("a.com");
    let p2 = RecordingFactory::new("p2").failing_zone("b.com");
    let p1_log = p1.log.clone();
    let p2_log = p2.log.clone();
    let engine = ApplyEngine::new(registry(vec![p1, p2]), FakeNetwork::empty().resolver());

    let profile = profile(json!({
        "providers": {"p1": ["a.com", "c.com"], "p2": ["b.com"]},
        "records": {"a.com": "10.0.0.1", "b.com": "10.0.0.2", "c.com": "10.0.0.3"},
    }));

    let err = engine.apply(&profile, false).await.unwrap_err();

    assert_eq!(err.errors().len(), 2);
    assert!(err.errors()[0].to_string().starts_with("provider \"p1\", zone \"a.com\""));
    assert!(err.errors()[1].to_string().starts_with("provider \"p2\", zone \"b.com\""));

    // every zone was attempted
    assert_eq!(p1_log.calls().len(), 2);
    assert_eq!(p2_log.calls().len(), 1);
}

#[tokio::test]
async fn missing_credential_aborts_before_any_zone() {
    let good = RecordingFactory::new("good");
    let good_log = good.log.clone();
    let network = FakeNetwork::new(
        FakeInterfaces::default(),
        FakeHostnames::default().with("example.org", &["192.0.2.1"]),
        FakeEcho::default(),
    );
    let engine = ApplyEngine::new(
        registry(vec![good, RecordingFactory::new("bad").without_credential()]),
        network.resolver(),
    );

    let profile = profile(json!({
        "providers": {"good": ["example.com"], "bad": ["example.net"]},
        "records": {"example.com": "hostname!example.org", "example.net": "10.0.0.1"},
    }));

    let err = engine.apply(&profile, false).await.unwrap_err();

    assert!(matches!(err.root_cause(), Error::MissingCredential(_)));
    assert!(err.to_string().starts_with("failed to create provider \"bad\""));
    assert!(good_log.calls().is_empty());
    assert_eq!(network.io_count(), 0);
}

#[tokio::test]
async fn unregistered_provider_aborts_the_run() {
    let engine = ApplyEngine::new(registry(vec![]), FakeNetwork::empty().resolver());

    let profile = profile(json!({
        "providers": {"route53": ["example.com"]},
        "records": {"example.com": "10.0.0.1"},
    }));

    let err = engine.apply(&profile, false).await.unwrap_err();
    assert!(matches!(err.root_cause(), Error::UnknownProvider(_)));
}

#[tokio::test]
async fn invalid_profile_fails_before_network_io() {
    let factory = RecordingFactory::new("p1");
    let created = factory.created.clone();
    let network = FakeNetwork::empty();
    let engine = ApplyEngine::new(registry(vec![factory]), network.resolver());

    // built by hand so the invalid mapping reaches the engine
    let profile = Profile::from_value(&json!({
        "providers": {"p1": ["example.com"]},
        "records": {"example.com": "external!", "example.org": "hostname!example.org"},
    }))
    .unwrap();

    let err = engine.apply(&profile, false).await.unwrap_err();

    assert!(matches!(err.root_cause(), Error::UnownedDomain(_)));
    assert_eq!(network.io_count(), 0);
    assert_eq!(created.load(std::sync::atomic::Ordering::SeqCst), 0);
}

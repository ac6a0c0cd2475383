//! Contract Test: Profile Parsing & Validation
//!
//! This test verifies the profile grammar end to end, from document text to
//! a validated profile.
//!
//! Constraints verified:
//! - String, array and object shapes decode to the right variants
//! - Mutually exclusive flags and fields are rejected
//! - Zone ownership is checked at parse time
//!
//! If this test fails, profiles may be misread.

use dnsmill_core::{
    Error, HostAddress, HostAddressFlag, HostAddressFlags, HostAddresses, Profile, Records,
};

#[test]
fn same_group_flags_are_rejected() {
    let err = HostAddressFlags::new([HostAddressFlag::Ip, HostAddressFlag::Interface]).unwrap_err();
    assert!(matches!(err, Error::ConflictingFlags { group: "type", .. }));

    assert!(HostAddress::parse("ipv4,ipv6!example.net").is_err());
}

#[test]
fn cross_group_flags_are_accepted() {
    let flags = HostAddressFlags::new([HostAddressFlag::Ipv4, HostAddressFlag::Hostname]).unwrap();
    assert_eq!(flags.kind(), Some(HostAddressFlag::Hostname));
}

#[test]
fn external_flag_needs_an_empty_address() {
    let err = Profile::from_json_str(
        r#"{"providers": {"p1": ["example.com"]}, "example.com": "external!203.0.113.1"}"#,
    )
    .unwrap_err();
    assert!(matches!(err.root_cause(), Error::ExternalWithAddress(_)));
}

#[test]
fn host_address_text_round_trips() {
    for text in [
        "203.0.113.5",
        "ip!203.0.113.5",
        "ipv6,interface!eth0",
        "interface,external!wg0",
        "external!",
        "hostname,ipv4!example.net",
    ] {
        let parsed: HostAddress = text.parse().unwrap();
        let rendered = parsed.to_string();
        let reparsed: HostAddress = rendered.parse().unwrap();

        assert_eq!(parsed, reparsed, "{text} rendered as {rendered}");
        assert_eq!(parsed.flags.kind(), reparsed.flags.kind());
        assert_eq!(parsed.flags.family(), reparsed.flags.family());
    }
}

#[test]
fn records_shapes() {
    let hosts: Records = serde_json::from_str(r#""10.0.0.1""#).unwrap();
    assert!(matches!(hosts, Records::Hosts(ref h) if h.len() == 1));

    let hosts: Records = serde_json::from_str(r#"{"hosts": ["10.0.0.1", "interface!eth0"]}"#).unwrap();
    assert!(matches!(hosts, Records::Hosts(ref h) if h.len() == 2));

    let cname: Records = serde_json::from_str(r#"{"cname": "example.net"}"#).unwrap();
    assert_eq!(cname, Records::Cname("example.net".to_string()));

    let both = serde_json::from_str::<Records>(r#"{"hosts": "10.0.0.1", "cname": "example.net"}"#);
    assert!(both.is_err());
}

#[test]
fn host_addresses_reject_bare_objects() {
    let err = serde_json::from_str::<HostAddresses>(r#"{"address": "10.0.0.1"}"#).unwrap_err();
    assert!(err.to_string().contains("expected string or array"));
}

#[test]
fn shorthand_and_closed_forms_agree() {
    let shorthand = Profile::from_json_str(
        r#"{
            "providers": {"p1": ["example.com"]},
            "example.com": "10.0.0.1",
            "www.example.com": {"cname": "example.com"}
        }"#,
    )
    .unwrap();
    let closed = Profile::from_json_str(
        r#"{
            "providers": {"p1": {"domains": ["example.com"]}},
            "records": {
                "example.com": "10.0.0.1",
                "www.example.com": {"cname": "example.com"}
            }
        }"#,
    )
    .unwrap();

    assert_eq!(shorthand, closed);
}

#[test]
fn closed_form_is_closed() {
    let err = Profile::from_json_str(
        r#"{"providers": {}, "records": {}, "example.com": "10.0.0.1"}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unexpected fields in profile"));
}

#[test]
fn zone_declared_by_two_providers_is_rejected() {
    let err = Profile::from_yaml_str(
        "providers:\n  p1: [example.com]\n  p2: [example.com]\nexample.com: 10.0.0.1\n",
    )
    .unwrap_err();
    assert!(matches!(err, Error::ZoneConflict(ref zone) if zone == "example.com"));
}

#[test]
fn record_outside_every_zone_is_rejected() {
    let err = Profile::from_yaml_str("providers:\n  p1: [example.com]\nexample.org: 10.0.0.1\n")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "domain \"example.org\" is not managed by any provider"
    );
}

#[test]
fn invalid_duplicate_policy_is_a_parse_failure() {
    let err = Profile::from_yaml_str("config:\n  duplicatePolicy: replace\nproviders: {}\n").unwrap_err();
    assert!(matches!(err.root_cause(), Error::InvalidPolicy(_)));
}

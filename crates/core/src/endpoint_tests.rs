// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[test]
fn from_json_full_params() {
    let endpoint = DeviceEndpoint::from_json(
        r#"{"id": "7", "name": "Main entrance", "ip_address": "192.168.1.50", "port": 4370}"#,
    )
    .unwrap();

    assert_eq!(endpoint.id, "7");
    assert_eq!(endpoint.name, "Main entrance");
    assert_eq!(endpoint.host, "192.168.1.50");
    assert_eq!(endpoint.port, 4370);
    assert_eq!(endpoint.timeout, DEFAULT_DEVICE_TIMEOUT_SECS);
}

#[parameterized(
    numeric_id = { r#"{"id": 3, "ip_address": "10.0.0.2"}"#, "3", 4370 },
    string_port = { r#"{"id": "1", "ip_address": "10.0.0.2", "port": "4371"}"#, "1", 4371 },
    host_alias = { r#"{"id": "1", "host": "10.0.0.2", "port": 5000}"#, "1", 5000 },
)]
fn from_json_lenient_fields(raw: &str, id: &str, port: u16) {
    let endpoint = DeviceEndpoint::from_json(raw).unwrap();
    assert_eq!(endpoint.id, id);
    assert_eq!(endpoint.host, "10.0.0.2");
    assert_eq!(endpoint.port, port);
    assert_eq!(endpoint.name, "N/A");
}

#[parameterized(
    not_json = { "device please" },
    missing_host = { r#"{"id": "1", "port": 4370}"# },
    port_out_of_range = { r#"{"id": "1", "ip_address": "10.0.0.2", "port": 70000}"# },
)]
fn from_json_rejects_garbage(raw: &str) {
    assert!(DeviceEndpoint::from_json(raw).is_err());
}

#[parameterized(
    empty_host = { DeviceEndpoint::new("1", "x", " ") },
    zero_port = { DeviceEndpoint::new("1", "x", "10.0.0.2").with_port(0) },
    zero_timeout = { DeviceEndpoint::new("1", "x", "10.0.0.2").with_timeout_secs(0) },
)]
fn validate_rejects(endpoint: DeviceEndpoint) {
    assert!(matches!(endpoint.validate(), Err(Error::InvalidEndpoint(_))));
}

#[test]
fn address_and_timeout() {
    let endpoint = DeviceEndpoint::new("1", "Door", "192.168.1.50").with_timeout_secs(9);
    assert_eq!(endpoint.address(), "192.168.1.50:4370");
    assert_eq!(endpoint.connect_timeout(), Duration::from_secs(9));
    assert_eq!(endpoint.to_string(), "Door (192.168.1.50:4370)");
}

#[parameterized(
    ipv4 = { "10.0.0.5", "10.0.0.5:4370" },
    ipv6 = { "fe80::1", "[fe80::1]:4370" },
    hostname = { "terminal.local", "terminal.local:4370" },
)]
fn address_formats_host(host: &str, expected: &str) {
    assert_eq!(DeviceEndpoint::new("1", "Door", host).address(), expected);
}

#[test]
fn serializes_with_host_application_field_names() {
    let endpoint = DeviceEndpoint::new("1", "Door", "192.168.1.50");
    let json = serde_json::to_value(&endpoint).unwrap();
    assert_eq!(json["ip_address"], "192.168.1.50");
    assert_eq!(json["port"], 4370);
    assert!(json.get("host").is_none());
}

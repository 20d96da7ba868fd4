// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end behavior of a running agent: the control API, the
//! cooperative standalone check, remote shutdown and the port-in-use guard.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use std::net::TcpListener;
use std::time::Duration;

use common::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn missing_config(temp: &TempDir) -> String {
    temp.path().join("none.toml").display().to_string()
}

#[test]
fn port_in_use_fails_loudly() {
    let temp = TempDir::new().unwrap();
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();

    punchd()
        .args(["run", "--config", &missing_config(&temp)])
        .args(["--bind", &addr.to_string()])
        .timeout(Duration::from_secs(10))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already in use"));
}

#[test]
fn standalone_serves_status_and_stops_on_request() {
    let temp = TempDir::new().unwrap();
    let addr = free_addr();
    let config = missing_config(&temp);
    let bind = addr.to_string();
    let mut agent = spawn_punchd(&["standalone", "--config", &config, "--bind", &bind]);

    let estado = wait_for_agent(addr);
    let estado: serde_json::Value = serde_json::from_str(&estado).unwrap();
    assert_eq!(estado["status"], "agente activo");
    assert_eq!(estado["tipo"], "standalone");
    assert_eq!(estado["conectado"], false);

    let (status, info) = http(addr, "GET", "/info").unwrap();
    assert_eq!(status, 200);
    let info: serde_json::Value = serde_json::from_str(&info).unwrap();
    assert_eq!(info["dispositivo_configurado"], false);
    assert_eq!(info["device_info"], serde_json::json!({}));

    let (status, ping) = http(addr, "GET", "/ping-device").unwrap();
    assert_eq!(status, 200);
    assert!(ping.contains("\"puede_sincronizar\":false"));

    punchd()
        .args(["status", "--bind", &bind])
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"));

    // A second launcher sees the first agent and leaves it alone.
    punchd()
        .args(["standalone", "--config", &config, "--bind", &bind])
        .timeout(Duration::from_secs(10))
        .assert()
        .success();
    assert!(http(addr, "GET", "/estado").is_some());

    let (status, _) = http(addr, "POST", "/shutdown").unwrap();
    assert_eq!(status, 200);
    let exit = wait_exit(&mut agent, Duration::from_secs(5)).expect("agent did not stop");
    assert!(exit.success());
}

#[test]
fn service_mode_has_no_remote_shutdown() {
    let temp = TempDir::new().unwrap();
    let addr = free_addr();
    let config = missing_config(&temp);
    let bind = addr.to_string();
    let mut agent = spawn_punchd(&["run", "--config", &config, "--bind", &bind]);

    let estado = wait_for_agent(addr);
    assert!(estado.contains("\"tipo\":\"servicio\""));

    let (status, _) = http(addr, "POST", "/shutdown").unwrap();
    assert_eq!(status, 404);
    assert!(http(addr, "GET", "/estado").is_some());

    let _ = agent.kill();
    let _ = agent.wait();
}

#[test]
fn unusable_device_param_still_starts() {
    let temp = TempDir::new().unwrap();
    let addr = free_addr();
    let config = missing_config(&temp);
    let bind = addr.to_string();
    let mut agent = spawn_punchd(&[
        "standalone",
        "--config",
        &config,
        "--bind",
        &bind,
        "--device",
        "{not json",
    ]);

    wait_for_agent(addr);
    let (_, info) = http(addr, "GET", "/info").unwrap();
    assert!(info.contains("\"dispositivo_configurado\":false"));

    let _ = http(addr, "POST", "/shutdown");
    assert!(wait_exit(&mut agent, Duration::from_secs(5)).is_some());
}

#[test]
fn broken_device_table_still_starts() {
    let temp = TempDir::new().unwrap();
    let addr = free_addr();
    let config = temp.path().join("punchd.toml");
    std::fs::write(&config, "[device]\nid = \"1\"\nip_address = \"\"\n").unwrap();
    let config = config.display().to_string();
    let bind = addr.to_string();
    let mut agent = spawn_punchd(&["standalone", "--config", &config, "--bind", &bind]);

    wait_for_agent(addr);
    let (_, info) = http(addr, "GET", "/info").unwrap();
    assert!(info.contains("\"dispositivo_configurado\":false"));

    let _ = http(addr, "POST", "/shutdown");
    assert!(wait_exit(&mut agent, Duration::from_secs(5)).is_some());
}

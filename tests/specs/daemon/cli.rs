// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface of the `punchd` binary: help, version, `init`
//! and `status` against a missing agent.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn version_flag_outputs_version() {
    punchd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("punchd "))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[parameterized(
    run = { "run" },
    standalone = { "standalone" },
    init = { "init" },
    status = { "status" },
)]
fn help_lists_subcommand(name: &str) {
    punchd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(name));
}

#[test]
fn no_subcommand_is_usage_error() {
    punchd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn init_writes_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("punchd.toml");

    punchd()
        .args(["init", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[collector]"));
    assert!(contents.contains("/api/zkteco/attendance"));
}

#[test]
fn init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("punchd.toml");
    std::fs::write(&path, "# mine\n").unwrap();

    punchd()
        .args(["init", "--config"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

    punchd()
        .args(["init", "--force", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert_ne!(std::fs::read_to_string(&path).unwrap(), "# mine\n");
}

#[test]
fn init_honors_config_env() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("from-env.toml");

    punchd()
        .arg("init")
        .env("PUNCHD_CONFIG", &path)
        .assert()
        .success();
    assert!(path.exists());
}

#[test]
fn status_without_agent_fails() {
    let addr = free_addr();

    punchd()
        .args(["status", "--bind", &addr.to_string()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no agent"));
}

#[test]
fn invalid_config_fails_loudly() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("punchd.toml");
    std::fs::write(&path, "[server\nbind = 1").unwrap();

    punchd()
        .args(["run", "--config"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error:"));
}

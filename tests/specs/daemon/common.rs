// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Shared by several test files; not every file uses every helper.
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::process::{Child, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

/// `punchd` with the device and config environment cleared.
pub fn punchd() -> Command {
    let mut cmd = cargo_bin_cmd!("punchd");
    cmd.env_remove("PUNCHD_DEVICE")
        .env_remove("PUNCHD_CONFIG")
        .env("RUST_LOG", "warn");
    cmd
}

/// Spawns a long-running `punchd` with the given arguments.
pub fn spawn_punchd(args: &[&str]) -> Child {
    std::process::Command::new(env!("CARGO_BIN_EXE_punchd"))
        .args(args)
        .env_remove("PUNCHD_DEVICE")
        .env_remove("PUNCHD_CONFIG")
        .env("RUST_LOG", "warn")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

/// A loopback address nothing is listening on.
pub fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Minimal HTTP/1.0 request. Returns the status code and body.
pub fn http(addr: SocketAddr, method: &str, path: &str) -> Option<(u16, String)> {
    let mut stream = TcpStream::connect_timeout(&addr, Duration::from_millis(500)).ok()?;
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;
    write!(
        stream,
        "{} {} HTTP/1.0\r\nHost: {}\r\nContent-Length: 0\r\n\r\n",
        method, path, addr
    )
    .ok()?;

    let mut response = String::new();
    stream.read_to_string(&mut response).ok()?;
    let status = response.split_whitespace().nth(1)?.parse().ok()?;
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    Some((status, body))
}

/// Polls `GET /estado` until the agent answers.
pub fn wait_for_agent(addr: SocketAddr) -> String {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if let Some((200, body)) = http(addr, "GET", "/estado") {
            return body;
        }
        thread::sleep(Duration::from_millis(50));
    }
    panic!("agent on {} never answered", addr);
}

/// Waits for `child` to exit, killing it after `limit`.
pub fn wait_exit(child: &mut Child, limit: Duration) -> Option<std::process::ExitStatus> {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return Some(status);
        }
        thread::sleep(Duration::from_millis(50));
    }
    let _ = child.kill();
    let _ = child.wait();
    None
}

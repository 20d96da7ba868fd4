// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Production device connector backed by an external terminal driver.
//!
//! Connecting verifies that the terminal accepts TCP connections on its
//! port. Listing attendance runs the configured driver program, which talks
//! the terminal protocol and prints the records as a JSON array on stdout:
//!
//! ```text
//! <command> [args...] --host 192.168.1.50 --port 4370 --timeout 5
//! [{"user_id": "12", "uid": 3, "timestamp": "2025-01-02 08:00:00", "status": 0, "punch": 0}]
//! ```
//!
//! The driver also receives `PUNCHD_DEVICE_ID` and `PUNCHD_DEVICE_NAME` in
//! its environment.

use std::process::Stdio;

use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::debug;

use punch_core::config::DriverConfig;
use punch_core::{AttendanceRecord, DeviceEndpoint};

use crate::device::{DeviceConnector, DeviceError, DeviceFuture, DeviceSession};

/// Longest stderr excerpt carried in a driver error.
const MAX_STDERR_CHARS: usize = 200;

/// Connector that probes the terminal over TCP and delegates record
/// download to an external driver.
pub struct DriverConnector {
    config: DriverConfig,
}

impl DriverConnector {
    pub fn new(config: DriverConfig) -> Self {
        DriverConnector { config }
    }
}

impl DeviceConnector for DriverConnector {
    fn connect<'a>(
        &'a self,
        endpoint: &'a DeviceEndpoint,
    ) -> DeviceFuture<'a, Box<dyn DeviceSession>> {
        Box::pin(async move {
            probe(endpoint).await?;

            debug!(host = %endpoint.host, port = endpoint.port, "terminal reachable");
            Ok(Box::new(DriverSession {
                endpoint: endpoint.clone(),
                config: self.config.clone(),
                open: true,
            }) as Box<dyn DeviceSession>)
        })
    }
}

/// Opens and drops a TCP connection to the terminal.
///
/// The terminal serves one client at a time, so the driver opens its own
/// connection for each listing.
async fn probe(endpoint: &DeviceEndpoint) -> Result<(), DeviceError> {
    let address = endpoint.address();
    TcpStream::connect(&address)
        .await
        .map(drop)
        .map_err(|e| DeviceError::Io(format!("{}: {}", address, e)))
}

/// Session handed out by [`DriverConnector`].
pub struct DriverSession {
    endpoint: DeviceEndpoint,
    config: DriverConfig,
    open: bool,
}

impl DriverSession {
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .arg("--host")
            .arg(&self.endpoint.host)
            .arg("--port")
            .arg(self.endpoint.port.to_string())
            .arg("--timeout")
            .arg(self.endpoint.timeout.to_string())
            .env("PUNCHD_DEVICE_ID", &self.endpoint.id)
            .env("PUNCHD_DEVICE_NAME", &self.endpoint.name)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl DeviceSession for DriverSession {
    fn ping(&mut self) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            if !self.open {
                return Err(DeviceError::Unavailable);
            }
            probe(&self.endpoint).await
        })
    }

    fn list_attendance(&mut self) -> DeviceFuture<'_, Vec<AttendanceRecord>> {
        Box::pin(async move {
            if !self.open {
                return Err(DeviceError::Unavailable);
            }

            let output = self.command().output().await.map_err(|e| {
                DeviceError::Io(format!(
                    "failed to run driver '{}': {}",
                    self.config.command, e
                ))
            })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let excerpt: String = stderr.trim().chars().take(MAX_STDERR_CHARS).collect();
                return Err(DeviceError::Io(format!(
                    "driver exited with {}: {}",
                    output.status, excerpt
                )));
            }

            parse_driver_output(&output.stdout)
        })
    }

    fn close(&mut self) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            self.open = false;
            Ok(())
        })
    }
}

/// Parses the driver's stdout. Empty output means no records.
pub fn parse_driver_output(stdout: &[u8]) -> Result<Vec<AttendanceRecord>, DeviceError> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|e| DeviceError::Io(format!("unreadable driver output: {}", e)))
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;

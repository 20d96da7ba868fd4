// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Device endpoint: where the attendance terminal lives on the network.
//!
//! An endpoint is loaded once at startup and never changes afterwards.
//! Field names follow the host application's parameter format
//! (`{"id": "1", "name": "...", "ip_address": "...", "port": 4370}`).

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Default TCP port of the attendance terminal.
pub const DEFAULT_DEVICE_PORT: u16 = 4370;

/// Default connect timeout in seconds.
pub const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 5;

/// Identifies exactly one attendance terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEndpoint {
    /// Identifier assigned by the host application.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Human-readable device name.
    #[serde(default = "default_name")]
    pub name: String,
    /// IP address or hostname of the terminal.
    #[serde(rename = "ip_address", alias = "host")]
    pub host: String,
    /// TCP port of the terminal.
    #[serde(default = "default_port", deserialize_with = "port_from_string_or_number")]
    pub port: u16,
    /// Connect timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_name() -> String {
    "N/A".to_string()
}

fn default_port() -> u16 {
    DEFAULT_DEVICE_PORT
}

fn default_timeout() -> u64 {
    DEFAULT_DEVICE_TIMEOUT_SECS
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Num(i64),
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Str(s) => s,
        StringOrNumber::Num(n) => n.to_string(),
    })
}

fn port_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Str(s) => s
            .trim()
            .parse::<u16>()
            .map_err(|_| D::Error::custom(format!("invalid port '{}'", s))),
        StringOrNumber::Num(n) => {
            u16::try_from(n).map_err(|_| D::Error::custom(format!("port out of range: {}", n)))
        }
    }
}

impl DeviceEndpoint {
    /// Creates an endpoint with the default port and timeout.
    pub fn new(id: impl Into<String>, name: impl Into<String>, host: impl Into<String>) -> Self {
        DeviceEndpoint {
            id: id.into(),
            name: name.into(),
            host: host.into(),
            port: DEFAULT_DEVICE_PORT,
            timeout: DEFAULT_DEVICE_TIMEOUT_SECS,
        }
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = secs;
        self
    }

    /// Parses and validates an endpoint from a JSON parameter string.
    pub fn from_json(raw: &str) -> Result<Self> {
        let endpoint: DeviceEndpoint = serde_json::from_str(raw.trim())?;
        endpoint.validate()?;
        Ok(endpoint)
    }

    /// Parses and validates an endpoint from a config file `[device]` table.
    pub fn from_table(table: toml::Table) -> Result<Self> {
        let endpoint: DeviceEndpoint = toml::Value::Table(table).try_into()?;
        endpoint.validate()?;
        Ok(endpoint)
    }

    /// Checks that the endpoint can be connected to.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidEndpoint("ip_address must not be empty".into()));
        }
        if self.port == 0 {
            return Err(Error::InvalidEndpoint("port must be non-zero".into()));
        }
        if self.timeout == 0 {
            return Err(Error::InvalidEndpoint("timeout must be at least 1 second".into()));
        }
        Ok(())
    }

    /// Returns the `host:port` socket address string. IPv6 literals are
    /// bracketed (`[fe80::1]:4370`).
    pub fn address(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }

    /// Returns the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl fmt::Display for DeviceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;

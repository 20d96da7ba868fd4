// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration.
//!
//! Configuration is stored in `punchd.toml` (by default under the user's
//! config directory) and includes:
//! - `server`: bind address of the local status API
//! - `device`: the terminal endpoint (optional; without it the agent runs
//!   unconfigured and only answers status queries)
//! - `driver`: external program that downloads attendance records
//! - `supervisor`: health-check cadence and operation timeout
//! - `collector`: remote collection API
//! - `sync`: optional periodic sync
//!
//! The device endpoint may also come from a command-line JSON parameter or
//! the `PUNCHD_DEVICE` environment variable; see [`resolve_device`].

use std::fmt;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::DeviceEndpoint;
use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "punchd";
const CONFIG_FILE_NAME: &str = "punchd.toml";

/// Environment variable carrying a JSON device endpoint.
pub const DEVICE_ENV_VAR: &str = "PUNCHD_DEVICE";

/// Default port of the local status API.
pub const DEFAULT_STATUS_PORT: u16 = 3322;

/// Starter configuration written by `punchd init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# punchd configuration

[server]
bind = "127.0.0.1:3322"

# Uncomment and edit with the data of your attendance terminal.
# [device]
# id = "1"
# name = "Attendance terminal"
# ip_address = "192.168.1.100"
# port = 4370
# timeout = 5

[driver]
command = "punch-driver"
args = []

[supervisor]
health_check_interval_secs = 300
operation_timeout_secs = 120

[collector]
base_url = "http://localhost:8000"
endpoint = "/api/zkteco/attendance"
timeout_secs = 60

[sync]
# 0 disables periodic sync; syncs then run only when triggered.
interval_secs = 0
"#;

/// Agent configuration stored in `punchd.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Terminal endpoint table, kept raw (optional - if absent, runs
    /// unconfigured). Checked by [`resolve_device`] so a broken table
    /// leaves the agent unconfigured instead of failing the load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<toml::Table>,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Local status API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the status API binds to (default: 127.0.0.1:3322).
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_STATUS_PORT))
}

/// External terminal driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Program that prints the terminal's attendance records as JSON.
    #[serde(default = "default_driver_command")]
    pub command: String,
    /// Extra arguments placed before `--host/--port/--timeout`.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            command: default_driver_command(),
            args: Vec::new(),
        }
    }
}

fn default_driver_command() -> String {
    "punch-driver".to_string()
}

/// Connection supervisor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Fixed interval between health-check ticks in seconds (default: 300).
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
    /// Upper bound on a single operation against a live session in seconds (default: 120).
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

impl SupervisorConfig {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        SupervisorConfig {
            health_check_interval_secs: default_health_check_interval_secs(),
            operation_timeout_secs: default_operation_timeout_secs(),
        }
    }
}

fn default_health_check_interval_secs() -> u64 {
    300
}

fn default_operation_timeout_secs() -> u64 {
    120
}

/// Remote collector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Base URL of the collector API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path joined onto `base_url` (an absolute path replaces the base path).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_collector_timeout_secs")]
    pub timeout_secs: u64,
}

impl CollectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            timeout_secs: default_collector_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_endpoint() -> String {
    "/api/zkteco/attendance".to_string()
}

fn default_collector_timeout_secs() -> u64 {
    60
}

/// Periodic sync settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between automatic syncs. 0 = disabled.
    #[serde(default)]
    pub interval_secs: u64,
}

impl SyncConfig {
    /// Returns the periodic sync interval, if enabled.
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }
}

impl Config {
    /// Loads configuration from the given file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Checks values that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.supervisor.health_check_interval_secs == 0 {
            return Err(Error::Config(
                "supervisor.health_check_interval_secs must be at least 1".into(),
            ));
        }
        if self.supervisor.operation_timeout_secs == 0 {
            return Err(Error::Config(
                "supervisor.operation_timeout_secs must be at least 1".into(),
            ));
        }
        if self.collector.timeout_secs == 0 {
            return Err(Error::Config(
                "collector.timeout_secs must be at least 1".into(),
            ));
        }
        if self.driver.command.trim().is_empty() {
            return Err(Error::Config("driver.command must not be empty".into()));
        }
        Ok(())
    }
}

/// Returns the default config file path (`<config_dir>/punchd/punchd.toml`).
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Writes the starter configuration to `path`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists\n  hint: use --force to overwrite it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    Ok(())
}

/// Where a device endpoint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSource {
    CommandLine,
    Environment,
    ConfigFile,
}

impl fmt::Display for DeviceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSource::CommandLine => write!(f, "command line"),
            DeviceSource::Environment => write!(f, "{}", DEVICE_ENV_VAR),
            DeviceSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Result of looking for a device endpoint across all sources.
#[derive(Debug)]
pub struct DeviceResolution {
    /// The endpoint in effect, if any source provided a valid one.
    pub endpoint: Option<(DeviceEndpoint, DeviceSource)>,
    /// Sources that were present but unusable, in precedence order.
    pub rejected: Vec<(DeviceSource, Error)>,
}

impl DeviceResolution {
    /// Takes the endpoint and its source, or `ConfigurationMissing`.
    pub fn require(self) -> Result<(DeviceEndpoint, DeviceSource)> {
        self.endpoint.ok_or(Error::ConfigurationMissing)
    }
}

/// Picks the device endpoint: command-line JSON, then environment JSON,
/// then the config file's `[device]` table. An unusable source is recorded
/// in `rejected` and the next source is tried.
pub fn resolve_device(
    cli_param: Option<&str>,
    env_param: Option<&str>,
    from_file: Option<&toml::Table>,
) -> DeviceResolution {
    let mut rejected = Vec::new();

    let candidates = [
        (DeviceSource::CommandLine, cli_param),
        (DeviceSource::Environment, env_param),
    ];
    for (source, raw) in candidates {
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            continue;
        };
        match DeviceEndpoint::from_json(raw) {
            Ok(endpoint) => {
                return DeviceResolution {
                    endpoint: Some((endpoint, source)),
                    rejected,
                }
            }
            Err(e) => rejected.push((source, e)),
        }
    }

    let endpoint = match from_file.map(|table| DeviceEndpoint::from_table(table.clone())) {
        Some(Ok(endpoint)) => Some((endpoint, DeviceSource::ConfigFile)),
        Some(Err(e)) => {
            rejected.push((DeviceSource::ConfigFile, e));
            None
        }
        None => None,
    };
    DeviceResolution { endpoint, rejected }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

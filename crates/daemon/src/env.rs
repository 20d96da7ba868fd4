// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for punchd.

use std::path::PathBuf;

/// Environment variable names read by the agent.
pub mod names {
    /// JSON device endpoint (`{"id", "name", "ip_address", "port"}`).
    pub const PUNCHD_DEVICE: &str = punch_core::config::DEVICE_ENV_VAR;

    /// Overrides the config file path.
    pub const PUNCHD_CONFIG: &str = "PUNCHD_CONFIG";

    /// Log level filter for tracing-subscriber.
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Returns the JSON device endpoint from `PUNCHD_DEVICE`, if set.
pub fn device_param() -> Option<String> {
    std::env::var(names::PUNCHD_DEVICE).ok()
}

/// Returns the value of `PUNCHD_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    std::env::var(names::PUNCHD_CONFIG).ok().map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

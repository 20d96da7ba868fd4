// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for punch-core operations.

use thiserror::Error;

/// All possible errors that can occur in punch-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no device endpoint configured\n  hint: pass --device, set PUNCHD_DEVICE, or add a [device] table to the config file")]
    ConfigurationMissing,

    #[error("invalid device endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid timestamp '{0}'\n  hint: expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// A specialized Result type for punch-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

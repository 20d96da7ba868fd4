// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for agent startup and the front-end commands.
//!
//! Device and collector failures never show up here: those are converted to
//! [`crate::device::DeviceError`] and [`punch_core::SyncOutcome`] at the
//! component boundary.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("control port {0} is already in use\n  hint: another punchd instance is probably running; stop it first")]
    AddrInUse(SocketAddr),

    #[error("invalid collector url '{url}': {reason}")]
    InvalidCollectorUrl { url: String, reason: String },

    #[error("no agent is answering on {0}")]
    AgentNotRunning(SocketAddr),

    #[error(transparent)]
    Core(#[from] punch_core::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for punchd operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

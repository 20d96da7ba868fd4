// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Device connectivity state published by the connection supervisor.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connectivity of the agent to its attendance terminal.
///
/// Written only by the connection supervisor; everything else reads a copy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectivityState {
    /// No session, no attempt in progress.
    #[default]
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// A live session is held.
    Connected,
    /// The session failed mid-use and was closed. Retained until the next
    /// connect attempt so status queries can report why.
    Degraded {
        last_error: String,
        since: DateTime<Utc>,
    },
}

impl ConnectivityState {
    /// Creates a degraded state stamped with the current time.
    pub fn degraded(last_error: impl Into<String>) -> Self {
        ConnectivityState::Degraded {
            last_error: last_error.into(),
            since: Utc::now(),
        }
    }

    /// Check if a live session is held.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectivityState::Connected)
    }

    /// Check if a connect attempt is in flight.
    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectivityState::Connecting)
    }

    /// Returns the string representation used in logs and status payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityState::Disconnected => "disconnected",
            ConnectivityState::Connecting => "connecting",
            ConnectivityState::Connected => "connected",
            ConnectivityState::Degraded { .. } => "degraded",
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectivityState::Degraded { last_error, since } => {
                write!(f, "degraded since {} ({})", since.to_rfc3339(), last_error)
            }
            other => write!(f, "{}", other.as_str()),
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

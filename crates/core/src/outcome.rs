// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome of one sync pipeline run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why an outbound request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum NetworkErrorKind {
    /// The request exceeded the client timeout.
    Timeout,
    /// Connection refused, unreachable host, or DNS failure.
    ConnectionRefused,
    /// Any other transport failure.
    Other(String),
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkErrorKind::Timeout => write!(f, "timeout"),
            NetworkErrorKind::ConnectionRefused => write!(f, "connection refused"),
            NetworkErrorKind::Other(detail) => write!(f, "{}", detail),
        }
    }
}

/// Classification of a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SyncResult {
    /// All records were accepted (or there were none to send).
    Success { message: Option<String> },
    /// The collector accepted the batch but enumerated rejected items.
    PartialFailure {
        rejected: usize,
        message: Option<String>,
    },
    /// The terminal could not be read.
    DeviceError { message: String },
    /// The collector could not be reached.
    NetworkError { kind: NetworkErrorKind },
    /// The collector answered with a non-success status.
    RemoteRejected { status: u16, message: String },
    /// Another sync was already running; nothing was done.
    AlreadyInProgress,
}

impl SyncResult {
    /// Returns the string representation used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncResult::Success { .. } => "success",
            SyncResult::PartialFailure { .. } => "partial_failure",
            SyncResult::DeviceError { .. } => "device_error",
            SyncResult::NetworkError { .. } => "network_error",
            SyncResult::RemoteRejected { .. } => "remote_rejected",
            SyncResult::AlreadyInProgress => "already_in_progress",
        }
    }
}

/// Result of one `run_sync` invocation. Surfaced to the caller and the log only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub attempted_at: DateTime<Utc>,
    pub record_count: usize,
    pub result: SyncResult,
}

impl SyncOutcome {
    /// Creates an outcome stamped with the current time.
    pub fn new(record_count: usize, result: SyncResult) -> Self {
        SyncOutcome {
            attempted_at: Utc::now(),
            record_count,
            result,
        }
    }

    /// An advisory outcome for a trigger that arrived during a running sync.
    pub fn already_in_progress() -> Self {
        Self::new(0, SyncResult::AlreadyInProgress)
    }

    /// A device-side failure; no records were read.
    pub fn device_error(message: impl Into<String>) -> Self {
        Self::new(
            0,
            SyncResult::DeviceError {
                message: message.into(),
            },
        )
    }

    /// Check if every record reached the collector.
    pub fn is_success(&self) -> bool {
        matches!(self.result, SyncResult::Success { .. })
    }

    /// Check if this outcome was skipped because another sync was running.
    pub fn is_already_in_progress(&self) -> bool {
        matches!(self.result, SyncResult::AlreadyInProgress)
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            SyncResult::Success { .. } => write!(f, "{} records synced", self.record_count),
            SyncResult::PartialFailure { rejected, .. } => write!(
                f,
                "{} of {} records rejected by collector",
                rejected, self.record_count
            ),
            SyncResult::DeviceError { message } => write!(f, "device error: {}", message),
            SyncResult::NetworkError { kind } => write!(f, "network error: {}", kind),
            SyncResult::RemoteRejected { status, message } => {
                write!(f, "collector rejected batch (HTTP {}): {}", status, message)
            }
            SyncResult::AlreadyInProgress => write!(f, "sync already in progress"),
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;

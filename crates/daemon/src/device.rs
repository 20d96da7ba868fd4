// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Device capability abstraction.
//!
//! The terminal's own protocol is opaque to the agent. All the agent needs
//! is to open a session, check it, list attendance records through it,
//! and close it.
//! The traits here enable:
//! - The external-driver implementation used in production ([`crate::driver`])
//! - Mock devices for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use punch_core::{AttendanceRecord, DeviceEndpoint};

/// Error type for device operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// No endpoint was configured; the agent runs read-only.
    #[error("no device configured")]
    NotConfigured,

    /// No live session is held.
    #[error("device not connected")]
    Unavailable,

    /// The device did not answer in time.
    #[error("device did not respond within {}s", .0.as_secs())]
    Timeout(Duration),

    /// The session failed mid-operation.
    #[error("device i/o error: {0}")]
    Io(String),
}

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Boxed future returned by device operations.
pub type DeviceFuture<'a, T> = Pin<Box<dyn Future<Output = DeviceResult<T>> + Send + 'a>>;

/// Opens sessions to a terminal.
pub trait DeviceConnector: Send + Sync {
    /// Connect to the terminal at `endpoint`.
    ///
    /// The caller bounds this with the endpoint's connect timeout.
    fn connect<'a>(&'a self, endpoint: &'a DeviceEndpoint)
        -> DeviceFuture<'a, Box<dyn DeviceSession>>;
}

/// A connected terminal session.
///
/// Owned exclusively by the connection supervisor.
pub trait DeviceSession: Send {
    /// Check that the terminal still answers.
    ///
    /// The caller bounds this with the endpoint's connect timeout.
    fn ping(&mut self) -> DeviceFuture<'_, ()>;

    /// Read the terminal's full current attendance log.
    fn list_attendance(&mut self) -> DeviceFuture<'_, Vec<AttendanceRecord>>;

    /// Release the session. Called exactly once before the session is dropped.
    fn close(&mut self) -> DeviceFuture<'_, ()>;
}

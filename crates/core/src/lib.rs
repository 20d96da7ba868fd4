// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! punch-core: Shared library for the punchd attendance relay agent
//!
//! This crate provides the data model (device endpoint, attendance records,
//! connectivity state, sync outcomes), the error taxonomy, and configuration
//! loading used by the punchd daemon and the status API types.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod outcome;
pub mod record;
pub mod state;

pub use config::{resolve_device, Config, DeviceResolution, DeviceSource};
pub use endpoint::DeviceEndpoint;
pub use error::{Error, Result};
pub use outcome::{NetworkErrorKind, SyncOutcome, SyncResult};
pub use record::{AttendanceRecord, AttendanceStatus, WireRecord};
pub use state::ConnectivityState;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! punchd: attendance relay agent.
//!
//! Keeps a session to one LAN attendance terminal, forwards its records to a
//! remote collector on demand, and answers status queries on a local HTTP
//! control API.
//!
//! - [`supervisor`]: owns the device session and its connectivity state
//! - [`pipeline`]: single-flight terminal-to-collector sync
//! - [`forwarder`]: outbound HTTP delivery
//! - [`status`]: the local control API

pub mod cli;
pub mod commands;
pub mod context;
pub mod device;
pub mod driver;
pub mod env;
pub mod error;
pub mod forwarder;
pub mod lifecycle;
pub mod pipeline;
pub mod runner;
pub mod server;
pub mod status;
pub mod supervisor;

#[cfg(test)]
mod test_helpers;

pub use cli::{Cli, Command};
pub use commands::run;
pub use error::{Error, Result};

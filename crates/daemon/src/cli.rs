// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

const AFTER_HELP: &str = "\
Examples:
  punchd init                               Write a starter config file
  punchd run                                Run as a service (no /shutdown)
  punchd standalone --device '{\"id\": \"1\", \"ip_address\": \"192.168.1.50\"}'
                                            Run on demand for the host app
  punchd status                             Query a running agent";

/// punchd: attendance relay agent
#[derive(Parser, Debug)]
#[command(name = "punchd", version)]
#[command(about = "Relays attendance records from a LAN terminal to a remote collector")]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the agent as a service or bare process
    Run(RunArgs),

    /// Run the agent on demand; exits quietly if one is already running
    Standalone(RunArgs),

    /// Write a default configuration file
    Init {
        /// Config file to write (default: platform config dir)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show what a running agent reports
    Status {
        /// Control API address of the agent (default: from config)
        #[arg(long, short)]
        bind: Option<SocketAddr>,

        /// Config file to read the address from
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

/// Options shared by `run` and `standalone`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file (default: $PUNCHD_CONFIG, then platform config dir)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Device endpoint as JSON, e.g. '{"id": "1", "ip_address": "192.168.1.50", "port": 4370}'
    #[arg(long, short, value_name = "JSON")]
    pub device: Option<String>,

    /// Control API address (overrides [server] bind)
    #[arg(long, short)]
    pub bind: Option<SocketAddr>,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

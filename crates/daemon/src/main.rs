// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! punchd - attendance relay agent.
//!
//! Usage:
//!   punchd run [--config <path>] [--device <json>]
//!   punchd standalone [--config <path>] [--device <json>]

use clap::Parser;
use punchd::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = punchd::run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

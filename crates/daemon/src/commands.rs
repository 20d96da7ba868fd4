// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Front-end commands: `run`, `standalone`, `init` and `status`.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use punch_api::{AgentMode, InfoResponse};
use punch_core::config::{default_config_path, write_default_config};
use punch_core::{resolve_device, Config};

use crate::cli::{Command, RunArgs};
use crate::env;
use crate::error::Result;
use crate::lifecycle::{fetch_info, probe_running_agent, PROBE_TIMEOUT};
use crate::runner::{run_agent, AgentOptions};

/// Executes a parsed command.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run_front_end(args, AgentMode::Service),
        Command::Standalone(args) => run_front_end(args, AgentMode::Standalone),
        Command::Init { config, force } => init(config, force),
        Command::Status { bind, config } => status(bind, config),
    }
}

/// Config file in effect: the flag, then `PUNCHD_CONFIG`, then the platform default.
pub fn config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(env::config_path)
        .unwrap_or_else(default_config_path)
}

/// Loads the configuration and resolves the device endpoint for an agent run.
pub fn load_options(args: &RunArgs, mode: AgentMode) -> Result<AgentOptions> {
    let path = config_path(args.config.clone());
    let mut config = Config::load_or_default(&path)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    config.validate()?;
    info!(path = %path.display(), "configuration loaded");

    let env_device = env::device_param();
    let resolution = resolve_device(
        args.device.as_deref(),
        env_device.as_deref(),
        config.device.as_ref(),
    );
    for (source, err) in &resolution.rejected {
        warn!(%source, error = %err, "ignoring unusable device parameter");
    }
    let endpoint = match resolution.require() {
        Ok((endpoint, source)) => {
            info!(%source, device = %endpoint, "device endpoint selected");
            Some(endpoint)
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    Ok(AgentOptions {
        config,
        endpoint,
        mode,
    })
}

fn run_front_end(args: RunArgs, mode: AgentMode) -> Result<()> {
    setup_logging(args.log_file.as_deref(), args.verbose);
    let options = load_options(&args, mode)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        if mode == AgentMode::Standalone {
            let bind = options.config.server.bind;
            if let Some(estado) = probe_running_agent(bind, PROBE_TIMEOUT).await {
                info!(
                    addr = %bind,
                    version = %estado.version,
                    tipo = %estado.tipo,
                    "agent already running; nothing to do"
                );
                return Ok(());
            }
        }
        run_agent(options).await
    })
}

fn init(config: Option<PathBuf>, force: bool) -> Result<()> {
    let path = config_path(config);
    write_default_config(&path, force)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn status(bind: Option<SocketAddr>, config: Option<PathBuf>) -> Result<()> {
    let bind = match bind {
        Some(bind) => bind,
        None => Config::load_or_default(&config_path(config))?.server.bind,
    };
    let rt = tokio::runtime::Runtime::new()?;
    let info = rt.block_on(fetch_info(bind, PROBE_TIMEOUT))?;
    print!("{}", format_info(&info));
    Ok(())
}

/// Renders an agent's `/info` answer for the terminal.
pub fn format_info(info: &InfoResponse) -> String {
    let device = if info.dispositivo_configurado {
        format!(
            "{} ({}:{})",
            info.device_info.dispositivo.as_deref().unwrap_or("N/A"),
            info.device_info.ip.as_deref().unwrap_or("?"),
            info.device_info
                .puerto
                .map(|port| port.to_string())
                .unwrap_or_else(|| "?".to_string()),
        )
    } else {
        "not configured".to_string()
    };
    let connected = if info.dispositivo_conectado { "yes" } else { "no" };
    format!(
        "{} {} ({})\ndevice:    {}\nconnected: {}\n",
        info.aplicacion, info.version, info.tipo, device, connected
    )
}

/// Initializes tracing: `RUST_LOG` if set, else `info` (`debug` with `verbose`).
/// Logs append to `log_file` without colors, falling back to stderr when it
/// cannot be opened.
fn setup_logging(log_file: Option<&Path>, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(env::names::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let file = log_file.and_then(|path| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    let _ = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent main loop: wires the components together and runs them until shutdown.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use punch_api::AgentMode;
use punch_core::{Config, DeviceEndpoint};

use crate::context::AgentContext;
use crate::device::DeviceConnector;
use crate::driver::DriverConnector;
use crate::error::Result;
use crate::forwarder::{HttpForwarder, RemoteForwarder};
use crate::pipeline::run_periodic;
use crate::server;
use crate::status;
use crate::supervisor::SupervisorSettings;

/// Everything needed to start an agent.
pub struct AgentOptions {
    pub config: Config,
    pub endpoint: Option<DeviceEndpoint>,
    pub mode: AgentMode,
}

/// Runs the agent with the production driver and HTTP forwarder.
///
/// Fails immediately if the control port is taken.
pub async fn run_agent(options: AgentOptions) -> Result<()> {
    let listener = server::bind(options.config.server.bind).await?;
    let forwarder = Arc::new(HttpForwarder::new(&options.config.collector)?);
    info!(url = %forwarder.url(), "collector");
    let connector = Box::new(DriverConnector::new(options.config.driver.clone()));
    run_with(listener, options, connector, forwarder).await
}

/// Runs the agent on an already bound listener with the given components.
pub async fn run_with(
    listener: TcpListener,
    options: AgentOptions,
    connector: Box<dyn DeviceConnector>,
    forwarder: Arc<dyn RemoteForwarder>,
) -> Result<()> {
    let AgentOptions {
        config,
        endpoint,
        mode,
    } = options;

    match &endpoint {
        Some(endpoint) => info!(device = %endpoint, "device configured"),
        None => warn!("no device configured; serving status only"),
    }

    let ctx = AgentContext::new(
        mode,
        endpoint,
        connector,
        forwarder,
        SupervisorSettings::from(&config.supervisor),
    );
    info!(version = %ctx.version, mode = %ctx.mode, "agent starting");

    let supervisor = tokio::spawn({
        let supervisor = Arc::clone(&ctx.supervisor);
        let shutdown = ctx.shutdown.clone();
        async move { supervisor.run(shutdown).await }
    });

    let scheduler = match config.sync.interval() {
        Some(every) if ctx.is_configured() => Some(tokio::spawn(run_periodic(
            Arc::clone(&ctx.pipeline),
            every,
            ctx.shutdown.clone(),
        ))),
        _ => None,
    };

    let signals = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move {
            tokio::select! {
                _ = server::shutdown_signal() => {
                    ctx.request_shutdown();
                }
                _ = ctx.shutdown.cancelled() => {}
            }
        }
    });

    let served = server::serve(listener, status::router(Arc::clone(&ctx)), ctx.shutdown.clone()).await;
    // Stop the other tasks even when the server failed.
    ctx.request_shutdown();

    let _ = signals.await;
    if let Some(scheduler) = scheduler {
        let _ = scheduler.await;
    }
    if ctx.pipeline.is_running() {
        info!("waiting for running sync to finish");
    }
    ctx.pipeline.wait_triggered().await;
    let _ = supervisor.await;
    // The supervisor gives up on a session still held by a sync.
    ctx.supervisor.disconnect().await;
    info!("agent stopped");
    served
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

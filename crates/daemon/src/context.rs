// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared agent context handed to every task and request handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use punch_api::AgentMode;
use punch_core::DeviceEndpoint;

use crate::device::DeviceConnector;
use crate::forwarder::RemoteForwarder;
use crate::pipeline::SyncPipeline;
use crate::supervisor::{ConnectionSupervisor, SupervisorSettings};

/// Everything the agent's tasks share. Built once at startup.
pub struct AgentContext {
    pub version: String,
    pub mode: AgentMode,
    pub supervisor: Arc<ConnectionSupervisor>,
    pub pipeline: Arc<SyncPipeline>,
    pub shutdown: CancellationToken,
    shutdown_requested: AtomicBool,
}

impl AgentContext {
    pub fn new(
        mode: AgentMode,
        endpoint: Option<DeviceEndpoint>,
        connector: Box<dyn DeviceConnector>,
        forwarder: Arc<dyn RemoteForwarder>,
        settings: SupervisorSettings,
    ) -> Arc<Self> {
        let supervisor = Arc::new(ConnectionSupervisor::new(endpoint, connector, settings));
        let pipeline = Arc::new(SyncPipeline::new(Arc::clone(&supervisor), forwarder));
        Arc::new(AgentContext {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode,
            supervisor,
            pipeline,
            shutdown: CancellationToken::new(),
            shutdown_requested: AtomicBool::new(false),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.supervisor.is_connected()
    }

    pub fn is_configured(&self) -> bool {
        self.supervisor.is_configured()
    }

    /// Starts a graceful shutdown. Returns false if one was already requested.
    pub fn request_shutdown(&self) -> bool {
        if self.shutdown_requested.swap(true, Ordering::AcqRel) {
            return false;
        }
        info!("shutdown requested");
        self.shutdown.cancel();
        true
    }
}

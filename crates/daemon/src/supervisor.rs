// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection supervision for the attendance terminal.
//!
//! The supervisor owns the single device session. A background loop
//! (re)connects on a fixed health-check cadence while the rest of the agent
//! reads the published [`ConnectivityState`] without touching the session.

use std::sync::RwLock;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use punch_core::config::SupervisorConfig;
use punch_core::{ConnectivityState, DeviceEndpoint};

use crate::device::{DeviceConnector, DeviceError, DeviceFuture, DeviceResult, DeviceSession};

/// How long shutdown waits to close a session that is busy.
const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Timing knobs for the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// Fixed interval between health-check ticks.
    pub health_check_interval: Duration,
    /// Upper bound on one operation against the live session.
    pub operation_timeout: Duration,
}

impl From<&SupervisorConfig> for SupervisorSettings {
    fn from(config: &SupervisorConfig) -> Self {
        SupervisorSettings {
            health_check_interval: config.health_check_interval(),
            operation_timeout: config.operation_timeout(),
        }
    }
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        SupervisorSettings::from(&SupervisorConfig::default())
    }
}

/// Connectivity state readable from any task.
///
/// Status handlers only ever take the read lock for a clone, so reads never
/// wait on device I/O.
#[derive(Debug, Default)]
pub struct SharedConnectivity {
    state: RwLock<ConnectivityState>,
}

impl SharedConnectivity {
    pub fn get(&self) -> ConnectivityState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, next: ConnectivityState) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *state != next {
            debug!(from = state.as_str(), to = next.as_str(), "connectivity changed");
        }
        *state = next;
    }

    pub fn is_connected(&self) -> bool {
        self.get().is_connected()
    }
}

/// Owns the device session and drives its lifecycle.
pub struct ConnectionSupervisor {
    endpoint: Option<DeviceEndpoint>,
    connector: Box<dyn DeviceConnector>,
    settings: SupervisorSettings,
    /// The live session. Also serializes connect attempts.
    session: Mutex<Option<Box<dyn DeviceSession>>>,
    state: SharedConnectivity,
    connect_requested: Notify,
}

impl ConnectionSupervisor {
    /// Creates a supervisor. Without an endpoint the agent runs unconfigured
    /// and every device operation reports [`DeviceError::NotConfigured`].
    pub fn new(
        endpoint: Option<DeviceEndpoint>,
        connector: Box<dyn DeviceConnector>,
        settings: SupervisorSettings,
    ) -> Self {
        ConnectionSupervisor {
            endpoint,
            connector,
            settings,
            session: Mutex::new(None),
            state: SharedConnectivity::default(),
            connect_requested: Notify::new(),
        }
    }

    pub fn endpoint(&self) -> Option<&DeviceEndpoint> {
        self.endpoint.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Snapshot of the current connectivity. Never blocks on device I/O.
    pub fn current_state(&self) -> ConnectivityState {
        self.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Wakes the supervision loop for an immediate connect attempt.
    pub fn request_connect(&self) {
        self.connect_requested.notify_one();
    }

    /// Connects now unless a session is already live.
    ///
    /// Attempts are serialized: a caller arriving during another attempt
    /// waits for it and returns its result without connecting again.
    pub async fn connect_now(&self) -> DeviceResult<()> {
        let endpoint = self.endpoint.as_ref().ok_or(DeviceError::NotConfigured)?;
        let mut session = self.session.lock().await;
        if session.is_some() {
            return Ok(());
        }

        self.state.set(ConnectivityState::Connecting);
        info!(host = %endpoint.host, port = endpoint.port, "connecting to terminal");

        let limit = endpoint.connect_timeout();
        let result = match tokio::time::timeout(limit, self.connector.connect(endpoint)).await {
            Ok(result) => result,
            Err(_) => Err(DeviceError::Timeout(limit)),
        };

        match result {
            Ok(live) => {
                *session = Some(live);
                self.state.set(ConnectivityState::Connected);
                info!(host = %endpoint.host, port = endpoint.port, "terminal connected");
                Ok(())
            }
            Err(e) => {
                self.state.set(ConnectivityState::Disconnected);
                warn!(host = %endpoint.host, port = endpoint.port, error = %e, "connect failed");
                Err(e)
            }
        }
    }

    /// Runs `f` against the live session.
    ///
    /// Returns [`DeviceError::Unavailable`] without connecting when no
    /// session is live. Any error (including the operation timeout) closes
    /// the session and leaves the supervisor degraded until the next tick.
    pub async fn with_session<T, F>(&self, f: F) -> DeviceResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s mut dyn DeviceSession) -> DeviceFuture<'s, T> + Send,
    {
        if self.endpoint.is_none() {
            return Err(DeviceError::NotConfigured);
        }
        if !self.state.is_connected() {
            return Err(DeviceError::Unavailable);
        }

        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut() else {
            return Err(DeviceError::Unavailable);
        };

        let limit = self.settings.operation_timeout;
        let result = match tokio::time::timeout(limit, f(session.as_mut())).await {
            Ok(result) => result,
            Err(_) => Err(DeviceError::Timeout(limit)),
        };

        if let Err(e) = &result {
            if let Some(mut failed) = guard.take() {
                if let Err(close_err) = failed.close().await {
                    debug!(error = %close_err, "close after failure");
                }
            }
            self.state.set(ConnectivityState::degraded(e.to_string()));
            warn!(error = %e, "device session failed; closed");
        }
        result
    }

    /// Closes the live session, if any.
    pub async fn disconnect(&self) {
        let mut guard = self.session.lock().await;
        if let Some(mut session) = guard.take() {
            if let Err(e) = session.close().await {
                debug!(error = %e, "close failed");
            }
            info!("terminal session closed");
        }
        self.state.set(ConnectivityState::Disconnected);
    }

    /// One health-check tick: check a live session, connect otherwise.
    pub async fn tick(&self) {
        if self.state.is_connected() {
            self.check_session().await;
            return;
        }
        // Failure is already logged and published.
        let _ = self.connect_now().await;
    }

    /// Pings the live session. A terminal that stopped answering is closed
    /// and left disconnected for the next tick to retry.
    ///
    /// A session busy with another operation is skipped.
    async fn check_session(&self) {
        let Some(endpoint) = &self.endpoint else {
            return;
        };
        let Ok(mut guard) = self.session.try_lock() else {
            debug!("health check: session busy");
            return;
        };
        let Some(session) = guard.as_mut() else {
            return;
        };

        let limit = endpoint.connect_timeout();
        let result = match tokio::time::timeout(limit, session.ping()).await {
            Ok(result) => result,
            Err(_) => Err(DeviceError::Timeout(limit)),
        };
        match result {
            Ok(()) => debug!("health check: connected"),
            Err(e) => {
                if let Some(mut lost) = guard.take() {
                    if let Err(close_err) = lost.close().await {
                        debug!(error = %close_err, "close after failed health check");
                    }
                }
                self.state.set(ConnectivityState::Disconnected);
                warn!(host = %endpoint.host, port = endpoint.port, error = %e, "terminal stopped answering");
            }
        }
    }

    /// Supervision loop. Returns once `shutdown` fires and the session is closed.
    pub async fn run(&self, shutdown: CancellationToken) {
        let Some(endpoint) = &self.endpoint else {
            info!("no device configured; supervisor idle");
            shutdown.cancelled().await;
            return;
        };
        info!(
            device = %endpoint,
            interval_secs = self.settings.health_check_interval.as_secs(),
            "supervisor started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.tick() => {}
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.connect_requested.notified() => debug!("connect requested"),
                _ = tokio::time::sleep(self.settings.health_check_interval) => {}
            }
        }

        if tokio::time::timeout(CLOSE_GRACE, self.disconnect()).await.is_err() {
            warn!("session busy at shutdown; dropping it");
            self.state.set(ConnectivityState::Disconnected);
        }
        info!("supervisor stopped");
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;

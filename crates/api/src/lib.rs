// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared payload types for the punchd local status API.
//!
//! This crate defines the JSON bodies exchanged between the `punchd` agent
//! and the host application (or `punchd status`). Field names are fixed by
//! the host application and are therefore Spanish.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use punch_core::DeviceEndpoint;

pub use punch_core::SyncOutcome;

/// Application name reported by `/info`.
pub const APPLICATION_NAME: &str = "punchd attendance relay";

/// Route paths of the status API.
pub mod paths {
    pub const ESTADO: &str = "/estado";
    pub const INFO: &str = "/info";
    pub const PING_DEVICE: &str = "/ping-device";
    pub const SHUTDOWN: &str = "/shutdown";
    pub const SINCRONIZAR: &str = "/sincronizar";
    pub const CONECTAR: &str = "/conectar";
    pub const SINCRONIZACION: &str = "/sincronizacion";
}

/// Which front-end is hosting the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentMode {
    /// Long-running service or bare process; cannot be stopped over HTTP.
    #[serde(rename = "servicio")]
    Service,
    /// Launched on demand by the host application; exposes `/shutdown`.
    #[serde(rename = "standalone")]
    Standalone,
}

impl AgentMode {
    /// Returns the string representation used in payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentMode::Service => "servicio",
            AgentMode::Standalone => "standalone",
        }
    }

    /// Check if `/shutdown` is served in this mode.
    pub fn allows_remote_shutdown(&self) -> bool {
        matches!(self, AgentMode::Standalone)
    }
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body of `GET /estado`: agent liveness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstadoResponse {
    pub status: String,
    pub instalado: bool,
    pub version: String,
    pub tipo: AgentMode,
    /// True only while a live device session is held.
    pub conectado: bool,
    pub timestamp: DateTime<Local>,
}

impl EstadoResponse {
    pub fn new(version: &str, mode: AgentMode, connected: bool) -> Self {
        EstadoResponse {
            status: "agente activo".to_string(),
            instalado: true,
            version: version.to_string(),
            tipo: mode,
            conectado: connected,
            timestamp: Local::now(),
        }
    }
}

/// Summary of the configured device. Serializes as `{}` when unconfigured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispositivo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puerto: Option<u16>,
}

impl DeviceInfo {
    pub fn from_endpoint(endpoint: Option<&DeviceEndpoint>) -> Self {
        match endpoint {
            Some(endpoint) => DeviceInfo {
                dispositivo: Some(endpoint.name.clone()),
                ip: Some(endpoint.host.clone()),
                puerto: Some(endpoint.port),
            },
            None => DeviceInfo::default(),
        }
    }
}

/// Body of `GET /info`: configured device summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub aplicacion: String,
    pub version: String,
    pub estado: String,
    pub tipo: AgentMode,
    pub dispositivo_configurado: bool,
    pub dispositivo_conectado: bool,
    pub device_info: DeviceInfo,
}

impl InfoResponse {
    pub fn new(
        version: &str,
        mode: AgentMode,
        endpoint: Option<&DeviceEndpoint>,
        connected: bool,
    ) -> Self {
        InfoResponse {
            aplicacion: APPLICATION_NAME.to_string(),
            version: version.to_string(),
            estado: "activo".to_string(),
            tipo: mode,
            dispositivo_configurado: endpoint.is_some(),
            dispositivo_conectado: connected,
            device_info: DeviceInfo::from_endpoint(endpoint),
        }
    }
}

/// Body of `GET /ping-device`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingDeviceResponse {
    pub dispositivo_conectado: bool,
    /// `connected && configured`.
    pub puede_sincronizar: bool,
}

impl PingDeviceResponse {
    pub fn new(connected: bool, configured: bool) -> Self {
        PingDeviceResponse {
            dispositivo_conectado: connected,
            puede_sincronizar: connected && configured,
        }
    }
}

/// Body of `POST /shutdown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownResponse {
    pub message: String,
}

/// Acknowledgement for trigger endpoints (`/sincronizar`, `/conectar`).
///
/// Carries whether the request was accepted, never the result of the work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub aceptado: bool,
    pub mensaje: String,
}

impl TriggerResponse {
    pub fn accepted(mensaje: impl Into<String>) -> Self {
        TriggerResponse {
            aceptado: true,
            mensaje: mensaje.into(),
        }
    }

    pub fn declined(mensaje: impl Into<String>) -> Self {
        TriggerResponse {
            aceptado: false,
            mensaje: mensaje.into(),
        }
    }
}

/// Body of `GET /sincronizacion`: the most recent outcome, if any.
pub type LastSyncResponse = Option<SyncOutcome>;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Detecting and querying a running agent over its control API.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use punch_api::{paths, EstadoResponse, InfoResponse};

use crate::error::{Error, Result};

/// How long a liveness probe waits for an answer.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Address to reach an agent bound on `bind`. Wildcard binds are probed on loopback.
pub fn probe_addr(bind: SocketAddr) -> SocketAddr {
    let ip = match bind.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, bind.port())
}

async fn get_json<T: DeserializeOwned>(bind: SocketAddr, path: &str, timeout: Duration) -> Result<T> {
    let client = Client::builder().timeout(timeout).build()?;
    let url = format!("http://{}{}", probe_addr(bind), path);
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.json().await?)
}

/// Returns the running agent's liveness answer, or None when nothing that
/// looks like an agent answers on `bind`.
pub async fn probe_running_agent(bind: SocketAddr, timeout: Duration) -> Option<EstadoResponse> {
    match get_json(bind, paths::ESTADO, timeout).await {
        Ok(estado) => Some(estado),
        Err(e) => {
            debug!(addr = %bind, error = %e, "no agent answering");
            None
        }
    }
}

/// Fetches `/info` from the agent on `bind`.
pub async fn fetch_info(bind: SocketAddr, timeout: Duration) -> Result<InfoResponse> {
    get_json(bind, paths::INFO, timeout)
        .await
        .map_err(|_| Error::AgentNotRunning(bind))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

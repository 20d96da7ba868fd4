// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound delivery of attendance batches to the collector API.
//!
//! A batch is POSTed as a single JSON array. The forwarder classifies the
//! reply and never retries; the next sync re-sends the full record set.

use std::future::Future;
use std::pin::Pin;

use reqwest::{header, Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use punch_core::config::CollectorConfig;
use punch_core::{NetworkErrorKind, WireRecord};

use crate::error::{Error, Result};

/// Longest excerpt of a non-JSON error body kept in an outcome.
const MAX_BODY_CHARS: usize = 200;

/// Classification of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The collector answered 200. `rejected` counts items it enumerated
    /// as refused in its reply body.
    Success {
        message: Option<String>,
        rejected: usize,
    },
    /// No HTTP response was obtained.
    NetworkError(NetworkErrorKind),
    /// The collector answered with a non-200 status.
    RemoteRejected { status: u16, message: String },
}

/// Boxed future returned by [`RemoteForwarder::send`].
pub type ForwardFuture<'a> = Pin<Box<dyn Future<Output = ForwardOutcome> + Send + 'a>>;

/// Delivers wire-format batches to the remote collector.
pub trait RemoteForwarder: Send + Sync {
    /// Send one batch. Never retries.
    fn send<'a>(&'a self, batch: &'a [WireRecord]) -> ForwardFuture<'a>;
}

/// Reply body the collector may send on success.
#[derive(Debug, Default, Deserialize)]
struct CollectorReply {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    rejected: Vec<serde_json::Value>,
}

/// Error body the collector may send on failure.
#[derive(Debug, Deserialize)]
struct CollectorError {
    message: String,
}

/// HTTP forwarder built on `reqwest`.
pub struct HttpForwarder {
    client: Client,
    url: Url,
}

impl HttpForwarder {
    /// Builds a forwarder posting to `base_url` joined with `endpoint`.
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let url = collector_url(&config.base_url, &config.endpoint)?;
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(HttpForwarder { client, url })
    }

    /// The resolved collector URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn post(&self, batch: &[WireRecord]) -> ForwardOutcome {
        debug!(url = %self.url, records = batch.len(), "posting batch");
        let response = match self
            .client
            .post(self.url.clone())
            .header(header::ACCEPT, "application/json")
            .json(batch)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let kind = classify_request_error(&e);
                warn!(url = %self.url, error = %e, "collector unreachable");
                return ForwardOutcome::NetworkError(kind);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ForwardOutcome::NetworkError(classify_request_error(&e)),
        };
        classify_response(status, &body)
    }
}

impl RemoteForwarder for HttpForwarder {
    fn send<'a>(&'a self, batch: &'a [WireRecord]) -> ForwardFuture<'a> {
        Box::pin(self.post(batch))
    }
}

/// Joins the collector base URL and endpoint path.
///
/// An absolute endpoint path replaces the base URL's path.
pub fn collector_url(base_url: &str, endpoint: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidCollectorUrl {
        url: format!("{}{}", base_url, endpoint),
        reason,
    };
    let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_string()));
    }
    base.join(endpoint).map_err(|e| invalid(e.to_string()))
}

/// Maps an HTTP status and body onto a forward outcome.
pub fn classify_response(status: StatusCode, body: &str) -> ForwardOutcome {
    if status == StatusCode::OK {
        let reply: CollectorReply = serde_json::from_str(body).unwrap_or_default();
        return ForwardOutcome::Success {
            message: reply.message,
            rejected: reply.rejected.len(),
        };
    }

    let message = match serde_json::from_str::<CollectorError>(body) {
        Ok(err) => err.message,
        Err(_) if !body.trim().is_empty() => body.trim().chars().take(MAX_BODY_CHARS).collect(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
    };
    ForwardOutcome::RemoteRejected {
        status: status.as_u16(),
        message,
    }
}

fn classify_request_error(e: &reqwest::Error) -> NetworkErrorKind {
    if e.is_timeout() {
        NetworkErrorKind::Timeout
    } else if e.is_connect() {
        NetworkErrorKind::ConnectionRefused
    } else {
        NetworkErrorKind::Other(e.to_string())
    }
}

#[cfg(test)]
#[path = "forwarder_tests.rs"]
mod tests;

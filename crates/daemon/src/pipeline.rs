// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight sync pipeline: read the terminal, forward to the collector.
//!
//! Every run re-reads the full attendance log and sends it as one batch.
//! The collector is expected to deduplicate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use punch_core::record::to_wire_batch;
use punch_core::{AttendanceRecord, SyncOutcome, SyncResult};

use crate::device::{DeviceFuture, DeviceSession};
use crate::forwarder::{ForwardOutcome, RemoteForwarder};
use crate::supervisor::ConnectionSupervisor;

/// Clears the in-flight flag when dropped.
///
/// Dropping also covers panics and cancelled sync futures.
/// The guard owns its flag so it can move into a spawned task.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn list_attendance(session: &mut dyn DeviceSession) -> DeviceFuture<'_, Vec<AttendanceRecord>> {
    session.list_attendance()
}

/// Moves attendance records from the terminal to the collector.
pub struct SyncPipeline {
    supervisor: Arc<ConnectionSupervisor>,
    forwarder: Arc<dyn RemoteForwarder>,
    in_flight: Arc<AtomicBool>,
    last_outcome: RwLock<Option<SyncOutcome>>,
    /// Background syncs started by [`SyncPipeline::spawn_sync`].
    triggered: TaskTracker,
}

impl SyncPipeline {
    pub fn new(supervisor: Arc<ConnectionSupervisor>, forwarder: Arc<dyn RemoteForwarder>) -> Self {
        SyncPipeline {
            supervisor,
            forwarder,
            in_flight: Arc::new(AtomicBool::new(false)),
            last_outcome: RwLock::new(None),
            triggered: TaskTracker::new(),
        }
    }

    /// Check if a sync is running right now.
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The outcome of the most recent completed sync, if any.
    pub fn last_outcome(&self) -> Option<SyncOutcome> {
        self.last_outcome
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Runs one sync. A call arriving while another is running returns
    /// [`SyncResult::AlreadyInProgress`] immediately and does nothing.
    pub async fn run_sync(&self) -> SyncOutcome {
        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("sync already in progress");
            return SyncOutcome::already_in_progress();
        };
        self.run_claimed(guard).await
    }

    async fn run_claimed(&self, _guard: InFlightGuard) -> SyncOutcome {
        let outcome = self.sync_once().await;
        match &outcome.result {
            SyncResult::Success { .. } => {
                info!(records = outcome.record_count, "sync complete: {}", outcome)
            }
            _ => warn!(records = outcome.record_count, "sync failed: {}", outcome),
        }

        *self
            .last_outcome
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(outcome.clone());
        outcome
    }

    async fn sync_once(&self) -> SyncOutcome {
        let records = match self
            .supervisor
            .with_session(list_attendance)
            .await
        {
            Ok(records) => records,
            Err(e) => return SyncOutcome::device_error(e.to_string()),
        };

        if records.is_empty() {
            return SyncOutcome::new(0, SyncResult::Success { message: None });
        }

        let batch = to_wire_batch(&records);
        info!(records = batch.len(), "forwarding attendance batch");
        let result = match self.forwarder.send(&batch).await {
            ForwardOutcome::Success {
                message,
                rejected: 0,
            } => SyncResult::Success { message },
            ForwardOutcome::Success { message, rejected } => {
                SyncResult::PartialFailure { rejected, message }
            }
            ForwardOutcome::NetworkError(kind) => SyncResult::NetworkError { kind },
            ForwardOutcome::RemoteRejected { status, message } => {
                SyncResult::RemoteRejected { status, message }
            }
        };
        SyncOutcome::new(batch.len(), result)
    }

    /// Starts a sync in the background. Returns false when one is already running.
    ///
    /// The in-flight flag is claimed before spawning, so of two racing
    /// callers exactly one gets `true`.
    pub fn spawn_sync(self: &Arc<Self>) -> bool {
        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("sync already in progress");
            return false;
        };
        let pipeline = Arc::clone(self);
        self.triggered.spawn(async move {
            pipeline.run_claimed(guard).await;
        });
        true
    }

    /// Waits for every background sync to finish. Later calls to
    /// [`SyncPipeline::spawn_sync`] are still tracked.
    pub async fn wait_triggered(&self) {
        self.triggered.close();
        self.triggered.wait().await;
    }
}

/// Runs a sync every `every` until `shutdown` fires.
///
/// The first sync happens one interval after start. A sync that is running
/// when shutdown fires is finished before returning.
pub async fn run_periodic(pipeline: Arc<SyncPipeline>, every: Duration, shutdown: CancellationToken) {
    info!(interval_secs = every.as_secs(), "periodic sync enabled");
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                pipeline.run_sync().await;
            }
        }
    }
    debug!("periodic sync stopped");
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

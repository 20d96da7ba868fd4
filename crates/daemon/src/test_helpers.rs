// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: a scriptable mock terminal and a recording forwarder.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::Notify;

use punch_core::{AttendanceRecord, AttendanceStatus, DeviceEndpoint, WireRecord};

use crate::device::{DeviceConnector, DeviceError, DeviceFuture, DeviceSession};
use crate::forwarder::{ForwardFuture, ForwardOutcome, RemoteForwarder};

/// The endpoint used throughout the daemon tests.
pub fn test_endpoint() -> DeviceEndpoint {
    DeviceEndpoint::new("1", "Front door", "192.168.1.50")
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 10)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// `count` records for users 1001, 1002, ... punching in from 08:00.
pub fn sample_records(count: usize) -> Vec<AttendanceRecord> {
    (0..count)
        .map(|i| AttendanceRecord {
            device_user_id: format!("{}", 1001 + i),
            badge_uid: i as u32 + 1,
            timestamp: at(8, i as u32 % 60),
            status: AttendanceStatus::CheckIn,
            punch_type: 0,
        })
        .collect()
}

/// Scriptable terminal shared between a [`MockConnector`] and its sessions.
#[derive(Default)]
pub struct MockDevice {
    pub connects: AtomicUsize,
    pub pings: AtomicUsize,
    pub lists: AtomicUsize,
    pub closes: AtomicUsize,
    /// Listings running right now, and the most ever seen at once.
    pub active_lists: AtomicUsize,
    pub max_active_lists: AtomicUsize,
    pub connect_fails: AtomicBool,
    pub list_fails: AtomicBool,
    pub connect_delay: Mutex<Option<Duration>>,
    pub records: Mutex<Vec<AttendanceRecord>>,
    /// When set, every listing waits for a permit on this gate.
    pub list_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(MockDevice::default())
    }

    pub fn with_records(records: Vec<AttendanceRecord>) -> Arc<Self> {
        let device = MockDevice::default();
        *device.records.lock().unwrap() = records;
        Arc::new(device)
    }

    pub fn set_connect_fails(&self, fail: bool) {
        self.connect_fails.store(fail, Ordering::SeqCst);
    }

    pub fn set_list_fails(&self, fail: bool) {
        self.list_fails.store(fail, Ordering::SeqCst);
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.lock().unwrap() = Some(delay);
    }

    /// Installs a gate that holds every listing until notified.
    pub fn gate_lists(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn max_active_lists(&self) -> usize {
        self.max_active_lists.load(Ordering::SeqCst)
    }
}

/// Connector handing out sessions on a [`MockDevice`].
pub struct MockConnector {
    device: Arc<MockDevice>,
}

impl MockConnector {
    pub fn new(device: &Arc<MockDevice>) -> Box<Self> {
        Box::new(MockConnector {
            device: Arc::clone(device),
        })
    }
}

impl DeviceConnector for MockConnector {
    fn connect<'a>(
        &'a self,
        _endpoint: &'a DeviceEndpoint,
    ) -> DeviceFuture<'a, Box<dyn DeviceSession>> {
        Box::pin(async move {
            self.device.connects.fetch_add(1, Ordering::SeqCst);
            let delay = *self.device.connect_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.device.connect_fails.load(Ordering::SeqCst) {
                return Err(DeviceError::Io("connection refused".into()));
            }
            Ok(Box::new(MockSession {
                device: Arc::clone(&self.device),
            }) as Box<dyn DeviceSession>)
        })
    }
}

pub struct MockSession {
    device: Arc<MockDevice>,
}

impl DeviceSession for MockSession {
    fn ping(&mut self) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            self.device.pings.fetch_add(1, Ordering::SeqCst);
            // An unreachable terminal fails pings the same way it fails connects.
            if self.device.connect_fails.load(Ordering::SeqCst) {
                return Err(DeviceError::Io("connection refused".into()));
            }
            Ok(())
        })
    }

    fn list_attendance(&mut self) -> DeviceFuture<'_, Vec<AttendanceRecord>> {
        Box::pin(async move {
            let device = &self.device;
            device.lists.fetch_add(1, Ordering::SeqCst);
            let active = device.active_lists.fetch_add(1, Ordering::SeqCst) + 1;
            device.max_active_lists.fetch_max(active, Ordering::SeqCst);

            let gate = device.list_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            device.active_lists.fetch_sub(1, Ordering::SeqCst);
            if device.list_fails.load(Ordering::SeqCst) {
                return Err(DeviceError::Io("read failed".into()));
            }
            Ok(device.records.lock().unwrap().clone())
        })
    }

    fn close(&mut self) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            self.device.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Forwarder that records batches and answers with a fixed outcome.
pub struct StubForwarder {
    pub batches: Mutex<Vec<Vec<WireRecord>>>,
    reply: Mutex<ForwardOutcome>,
}

impl StubForwarder {
    pub fn new() -> Arc<Self> {
        Self::replying(ForwardOutcome::Success {
            message: Some("ok".to_string()),
            rejected: 0,
        })
    }

    pub fn replying(reply: ForwardOutcome) -> Arc<Self> {
        Arc::new(StubForwarder {
            batches: Mutex::new(Vec::new()),
            reply: Mutex::new(reply),
        })
    }

    pub fn sent(&self) -> Vec<Vec<WireRecord>> {
        self.batches.lock().unwrap().clone()
    }
}

impl RemoteForwarder for StubForwarder {
    fn send<'a>(&'a self, batch: &'a [WireRecord]) -> ForwardFuture<'a> {
        Box::pin(async move {
            self.batches.lock().unwrap().push(batch.to_vec());
            self.reply.lock().unwrap().clone()
        })
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// RAII guard that sets/removes env vars and restores them on drop.
///
/// Holds a process-wide lock so tests touching the environment run one at a time.
pub struct EnvGuard {
    original: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Applies every change at once; `None` removes the variable.
    pub fn apply(changes: &[(&'static str, Option<&str>)]) -> Self {
        let lock = env_lock();
        let original = changes
            .iter()
            .map(|(key, value)| {
                let before = std::env::var(key).ok();
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
                (*key, before)
            })
            .collect();
        Self {
            original,
            _lock: lock,
        }
    }

    pub fn set(key: &'static str, value: &str) -> Self {
        Self::apply(&[(key, Some(value))])
    }

    pub fn remove(key: &'static str) -> Self {
        Self::apply(&[(key, None)])
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.original {
            match value {
                Some(val) => std::env::set_var(key, val),
                None => std::env::remove_var(key),
            }
        }
    }
}

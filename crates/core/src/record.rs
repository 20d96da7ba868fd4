// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Attendance records as read from the terminal and as sent to the collector.
//!
//! Records are never stored locally: each sync reads the terminal's full
//! record set and forwards it as-is. The collector is the system of record.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timestamp format used on the wire and by the terminal driver.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Punch status reported by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum AttendanceStatus {
    CheckIn,
    CheckOut,
    BreakOut,
    BreakIn,
    OvertimeIn,
    OvertimeOut,
    /// A code outside the standard set, forwarded untouched.
    Other(u8),
}

impl AttendanceStatus {
    /// Returns the raw code the terminal uses for this status.
    pub fn code(&self) -> u8 {
        match self {
            AttendanceStatus::CheckIn => 0,
            AttendanceStatus::CheckOut => 1,
            AttendanceStatus::BreakOut => 2,
            AttendanceStatus::BreakIn => 3,
            AttendanceStatus::OvertimeIn => 4,
            AttendanceStatus::OvertimeOut => 5,
            AttendanceStatus::Other(code) => *code,
        }
    }

    /// Returns the string representation used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::CheckIn => "check_in",
            AttendanceStatus::CheckOut => "check_out",
            AttendanceStatus::BreakOut => "break_out",
            AttendanceStatus::BreakIn => "break_in",
            AttendanceStatus::OvertimeIn => "overtime_in",
            AttendanceStatus::OvertimeOut => "overtime_out",
            AttendanceStatus::Other(_) => "other",
        }
    }
}

impl From<u8> for AttendanceStatus {
    fn from(code: u8) -> Self {
        match code {
            0 => AttendanceStatus::CheckIn,
            1 => AttendanceStatus::CheckOut,
            2 => AttendanceStatus::BreakOut,
            3 => AttendanceStatus::BreakIn,
            4 => AttendanceStatus::OvertimeIn,
            5 => AttendanceStatus::OvertimeOut,
            other => AttendanceStatus::Other(other),
        }
    }
}

impl From<AttendanceStatus> for u8 {
    fn from(status: AttendanceStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Other(code) => write!(f, "other({})", code),
            status => write!(f, "{}", status.as_str()),
        }
    }
}

/// A single punch recorded by the terminal.
///
/// The serialized field names match the output of the terminal driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// User identifier enrolled on the terminal. Drivers may print it as a number.
    #[serde(rename = "user_id", deserialize_with = "crate::endpoint::string_or_number")]
    pub device_user_id: String,
    /// Internal badge/slot number on the terminal.
    #[serde(rename = "uid")]
    pub badge_uid: u32,
    /// Device-local wall clock time of the punch.
    #[serde(with = "device_time")]
    pub timestamp: NaiveDateTime,
    pub status: AttendanceStatus,
    #[serde(rename = "punch")]
    pub punch_type: u8,
}

impl AttendanceRecord {
    /// Maps this record to the collector's wire schema.
    pub fn to_wire(&self) -> WireRecord {
        WireRecord::from(self)
    }
}

/// Record shape expected by the collector API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecord {
    pub uid: u32,
    pub id: String,
    /// `YYYY-MM-DD HH:MM:SS`, device-local.
    pub timestamp: String,
    pub state: u8,
    #[serde(rename = "type")]
    pub kind: u8,
}

impl From<&AttendanceRecord> for WireRecord {
    fn from(record: &AttendanceRecord) -> Self {
        WireRecord {
            uid: record.badge_uid,
            id: record.device_user_id.clone(),
            timestamp: record.timestamp.format(WIRE_TIMESTAMP_FORMAT).to_string(),
            state: record.status.code(),
            kind: record.punch_type,
        }
    }
}

/// Maps a batch of records to the wire schema, preserving order.
pub fn to_wire_batch(records: &[AttendanceRecord]) -> Vec<WireRecord> {
    records.iter().map(WireRecord::from).collect()
}

/// Parses a device timestamp.
///
/// Accepts the wire format and ISO 8601 with a `T` separator.
pub fn parse_device_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, WIRE_TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| Error::InvalidTimestamp(s.to_string()))
}

mod device_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_device_timestamp, WIRE_TIMESTAMP_FORMAT};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(WIRE_TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_device_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;

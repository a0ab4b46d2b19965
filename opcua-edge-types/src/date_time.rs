// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `UaDateTime`.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Number of 100 nanosecond ticks in one millisecond.
pub const TICKS_PER_MILLISECOND: i64 = 10_000;

/// The difference between the OPC UA epoch (1601-01-01) and the Unix epoch
/// (1970-01-01), expressed in 100 nanosecond ticks.
pub const UNIX_EPOCH_OFFSET_TICKS: i64 = 116_444_736_000_000_000;

/// An OPC UA timestamp: 100 nanosecond ticks since 1601-01-01 00:00:00 UTC.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default, Serialize, Deserialize)]
pub struct UaDateTime(i64);

impl fmt::Debug for UaDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UaDateTime({} ms)", self.as_unix_ms())
    }
}

impl UaDateTime {
    /// The current wall clock time.
    pub fn now() -> UaDateTime {
        UaDateTime::from_unix_ms(Utc::now().timestamp_millis())
    }

    /// A timestamp from raw ticks since the OPC UA epoch.
    pub fn from_ticks(ticks: i64) -> UaDateTime {
        UaDateTime(ticks)
    }

    /// A timestamp from Unix milliseconds.
    pub fn from_unix_ms(millis: i64) -> UaDateTime {
        UaDateTime(millis * TICKS_PER_MILLISECOND + UNIX_EPOCH_OFFSET_TICKS)
    }

    /// Raw ticks since the OPC UA epoch.
    pub fn ticks(self) -> i64 {
        self.0
    }

    /// Milliseconds since the Unix epoch.
    pub fn as_unix_ms(self) -> i64 {
        (self.0 - UNIX_EPOCH_OFFSET_TICKS) / TICKS_PER_MILLISECOND
    }

    /// True for the zero timestamp, which OPC UA treats as "no time".
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `DataValue`.

use crate::{EdgeVariant, StatusCode, UaDateTime};

/// Which timestamps a Read or a monitored item should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampsToReturn {
    /// Only the source timestamp.
    Source,
    /// Only the server timestamp.
    Server,
    /// Both timestamps.
    Both,
    /// No timestamps.
    Neither,
}

/// A value with its quality and timestamps, as delivered by Read and by
/// data change notifications.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    /// The value. Absent when the read failed.
    pub value: Option<EdgeVariant>,
    /// Quality of the value.
    pub status: StatusCode,
    /// When the source produced the value.
    pub source_timestamp: Option<UaDateTime>,
    /// When the server obtained the value.
    pub server_timestamp: Option<UaDateTime>,
}

impl DataValue {
    /// A good quality value without timestamps.
    pub fn new(value: impl Into<EdgeVariant>) -> DataValue {
        DataValue {
            value: Some(value.into()),
            status: StatusCode::Good,
            source_timestamp: None,
            server_timestamp: None,
        }
    }

    /// A good quality value stamped with the supplied time for both source
    /// and server.
    pub fn new_at(value: impl Into<EdgeVariant>, time: UaDateTime) -> DataValue {
        DataValue {
            value: Some(value.into()),
            status: StatusCode::Good,
            source_timestamp: Some(time),
            server_timestamp: Some(time),
        }
    }

    /// A value-less result carrying only a status code.
    pub fn new_status(status: StatusCode) -> DataValue {
        DataValue {
            value: None,
            status,
            source_timestamp: None,
            server_timestamp: None,
        }
    }
}

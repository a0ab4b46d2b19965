// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Protocol constants of the adapter.

/// Shortest cycle of the per-session publish task, in milliseconds.
pub const MINIMUM_PUBLISHING_TIME_MS: u64 = 100;

/// Max age passed with every Read request, in milliseconds. Results whose
/// server timestamp is older than twice this value are rejected.
pub const READ_MAX_AGE_MS: f64 = 2000.0;

/// Window within which Read timestamps are considered sane, in
/// milliseconds (one day).
pub const TIMESTAMP_VALID_WINDOW_MS: i64 = 86_400_000;

/// Sequence number requested from the server on Republish.
pub const REPUBLISH_RETRANSMIT_SEQUENCE: u32 = 2;

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Command executors. Each takes a cloned request off the send queue,
//! performs the protocol call against a session and answers through the
//! receive queue: a response message on success, an error message
//! otherwise.

pub(crate) mod browse;
pub(crate) mod method;
pub(crate) mod read;
pub(crate) mod subscription;
pub(crate) mod write;

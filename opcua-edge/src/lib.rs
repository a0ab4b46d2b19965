// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

#![warn(missing_docs)]

//! Asynchronous OPC UA edge adapter.
//!
//! The adapter is a bidirectional façade over an underlying OPC UA stack:
//! applications drive client sessions and host a server through a uniform,
//! message oriented API. Requests are validated, deep-copied and enqueued
//! on a send queue; a worker dispatches them to command executors which
//! perform the protocol calls and push results (or error reports) onto a
//! receive queue, from which they are delivered to registered callbacks.
//! Long-lived subscriptions are owned per session, with a publish task
//! driving the notification flow.
//!
//! The wire protocol itself is out of scope: the stack is reached through
//! the [`UaConnector`] and [`UaSession`] traits, and a hosted server's node
//! store through [`ServerBackend`].

mod callbacks;
mod command;
mod constants;
mod discovery;
mod dispatcher;
mod manager;
mod queue;
mod server;
mod session;
mod stack;
mod subscription;
mod validation;

pub use callbacks::{
    DiscoveryCallback, DiscoveryCallbacks, ResponseCallback, ResponseCallbacks, StatusCallback,
    StatusCallbacks,
};
pub use constants::*;
pub use manager::{EdgeConfigure, EdgeManager};
pub use server::{EdgeReference, NodeItem, ServerBackend};
pub use stack::{NotificationSink, UaConnector, UaSession};

pub use opcua_edge_types as types;

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Adapter specific errors.

use thiserror::Error;

use crate::{EdgeStatusCode, StatusCode};

/// Errors surfaced synchronously from the adapter API.
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum EdgeError {
    #[error("Invalid parameter: {0}")]
    ParamInvalid(&'static str),
    #[error("Subsystem is already initialized")]
    AlreadyInit,
    #[error("Queue subsystem rejected the message")]
    Enqueue,
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Service call returned a bad status code: {0}")]
    ServiceResult(StatusCode),
    #[error("Operation is not supported")]
    NotSupport,
}

impl EdgeError {
    /// The result code equivalent of this error, as carried inside
    /// messages.
    pub fn status_code(&self) -> EdgeStatusCode {
        match self {
            EdgeError::ParamInvalid(_) => EdgeStatusCode::ParamInvalid,
            EdgeError::AlreadyInit => EdgeStatusCode::AlreadyInit,
            EdgeError::Enqueue => EdgeStatusCode::EnqueueError,
            EdgeError::Internal(_) => EdgeStatusCode::InternalError,
            EdgeError::ServiceResult(_) => EdgeStatusCode::ServiceResultBad,
            EdgeError::NotSupport => EdgeStatusCode::NotSupport,
        }
    }
}

impl From<StatusCode> for EdgeError {
    fn from(value: StatusCode) -> Self {
        EdgeError::ServiceResult(value)
    }
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Status codes crossing the adapter API: the caller-facing result codes,
//! the subset of OPC UA service status codes the adapter produces and
//! inspects, and the session lifecycle events reported through the status
//! callback.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Result code attached to messages and returned from the caller-facing
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStatusCode {
    /// The operation succeeded.
    Ok,
    /// The request was structurally invalid and was not enqueued.
    ParamInvalid,
    /// The subsystem was already initialized.
    AlreadyInit,
    /// Generic failure.
    Error,
    /// Failure inside the adapter itself.
    InternalError,
    /// The queue subsystem rejected the message.
    EnqueueError,
    /// The underlying service call returned a bad service result.
    ServiceResultBad,
    /// The requested operation is not supported.
    NotSupport,
    /// An OPC UA status code passed through unchanged.
    Service(StatusCode),
}

impl Display for EdgeStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeStatusCode::Ok => write!(f, "Ok"),
            EdgeStatusCode::ParamInvalid => write!(f, "ParamInvalid"),
            EdgeStatusCode::AlreadyInit => write!(f, "AlreadyInit"),
            EdgeStatusCode::Error => write!(f, "Error"),
            EdgeStatusCode::InternalError => write!(f, "InternalError"),
            EdgeStatusCode::EnqueueError => write!(f, "EnqueueError"),
            EdgeStatusCode::ServiceResultBad => write!(f, "ServiceResultBad"),
            EdgeStatusCode::NotSupport => write!(f, "NotSupport"),
            EdgeStatusCode::Service(code) => write!(f, "{}", code.name()),
        }
    }
}

/// The OPC UA status codes this adapter returns or matches on. The full
/// status code space is owned by the underlying stack; only the codes that
/// cross the seam are enumerated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusCode {
    /// The operation was successful.
    #[default]
    Good,
    /// An unexpected error occurred.
    BadUnexpectedError,
    /// An internal error occurred as a result of a programming or
    /// configuration error.
    BadInternalError,
    /// Not enough memory to complete the operation.
    BadOutOfMemory,
    /// The operation timed out.
    BadTimeout,
    /// The node id refers to a node that does not exist.
    BadNodeIdUnknown,
    /// The attribute is not supported for the specified node.
    BadAttributeIdInvalid,
    /// The timestamp is outside the range allowed by the server.
    BadInvalidTimestamp,
    /// The request was cancelled by the client.
    BadRequestCancelledByClient,
    /// The subscription id is not valid.
    BadSubscriptionIdInvalid,
    /// The monitored item id does not refer to a valid monitored item.
    BadMonitoredItemIdInvalid,
    /// There is no subscription available for this session.
    BadNoSubscription,
    /// The requested notification message is no longer available.
    BadMessageNotAvailable,
    /// One or more arguments are invalid.
    BadInvalidArgument,
    /// The server does not support the requested service.
    BadServiceUnsupported,
    /// The operation could not complete because the client is not connected.
    BadServerNotConnected,
    /// The communication channel failed.
    BadCommunicationError,
    /// The endpoint url is not valid.
    BadTcpEndpointUrlInvalid,
    /// The continuation point provided is no longer valid.
    BadContinuationPointInvalid,
}

impl StatusCode {
    /// True only for `Good`.
    pub fn is_good(self) -> bool {
        self == StatusCode::Good
    }

    /// True for any code other than `Good`.
    pub fn is_bad(self) -> bool {
        !self.is_good()
    }

    /// Symbolic name of the code, e.g. `"Good"` or `"BadNodeIdUnknown"`.
    pub fn name(self) -> &'static str {
        match self {
            StatusCode::Good => "Good",
            StatusCode::BadUnexpectedError => "BadUnexpectedError",
            StatusCode::BadInternalError => "BadInternalError",
            StatusCode::BadOutOfMemory => "BadOutOfMemory",
            StatusCode::BadTimeout => "BadTimeout",
            StatusCode::BadNodeIdUnknown => "BadNodeIdUnknown",
            StatusCode::BadAttributeIdInvalid => "BadAttributeIdInvalid",
            StatusCode::BadInvalidTimestamp => "BadInvalidTimestamp",
            StatusCode::BadRequestCancelledByClient => "BadRequestCancelledByClient",
            StatusCode::BadSubscriptionIdInvalid => "BadSubscriptionIdInvalid",
            StatusCode::BadMonitoredItemIdInvalid => "BadMonitoredItemIdInvalid",
            StatusCode::BadNoSubscription => "BadNoSubscription",
            StatusCode::BadMessageNotAvailable => "BadMessageNotAvailable",
            StatusCode::BadInvalidArgument => "BadInvalidArgument",
            StatusCode::BadServiceUnsupported => "BadServiceUnsupported",
            StatusCode::BadServerNotConnected => "BadServerNotConnected",
            StatusCode::BadCommunicationError => "BadCommunicationError",
            StatusCode::BadTcpEndpointUrlInvalid => "BadTcpEndpointUrlInvalid",
            StatusCode::BadContinuationPointInvalid => "BadContinuationPointInvalid",
        }
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Session and server lifecycle events delivered through the status
/// callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// A server instance started.
    ServerStarted,
    /// A client session was established.
    ClientStarted,
    /// A server instance stopped.
    StopServer,
    /// A client session was torn down.
    StopClient,
    /// The transport connection came up.
    Connected,
    /// The transport connection went away.
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_name_round_trip() {
        assert_eq!(StatusCode::Good.name(), "Good");
        assert_eq!(
            StatusCode::BadRequestCancelledByClient.name(),
            "BadRequestCancelledByClient"
        );
        assert!(StatusCode::Good.is_good());
        assert!(StatusCode::BadNoSubscription.is_bad());
    }

    #[test]
    fn edge_status_display_echoes_service_code() {
        let code = EdgeStatusCode::Service(StatusCode::BadNodeIdUnknown);
        assert_eq!(code.to_string(), "BadNodeIdUnknown");
    }
}

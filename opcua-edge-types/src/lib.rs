// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

#![warn(missing_docs)]

//! Data types for the OPC UA edge adapter.
//!
//! This crate contains the message model exchanged between an application
//! and the adapter core, together with the wire-adjacent value types
//! (variants, node identifiers, timestamps, endpoint and application
//! descriptions) the underlying OPC UA stack produces and consumes.

mod byte_string;
mod data_value;
mod date_time;
mod diagnostic_info;
mod endpoint;
mod errors;
mod guid;
mod localized_text;
mod message;
mod node_id;
mod service;
mod status;
mod variant;

pub use byte_string::ByteString;
pub use data_value::{DataValue, TimestampsToReturn};
pub use date_time::UaDateTime;
pub use diagnostic_info::EdgeDiagnosticInfo;
pub use endpoint::{
    ApplicationConfig, ApplicationType, ApplicationTypeMask, Device, EndpointConfig, EndpointInfo,
    SecurityMode,
};
pub use errors::EdgeError;
pub use guid::Guid;
pub use localized_text::LocalizedText;
pub use message::{
    ArgValType, BrowseParam, EdgeBrowseResult, EdgeCommand, EdgeMessage, EdgeRequest, EdgeResponse,
    MessageType, MethodArg, MethodParams, SubRequest, SubType,
};
pub use node_id::{EdgeNodeId, EdgeNodeInfo, Identifier};
pub use service::{
    ApplicationDescription, BrowseDescription, BrowseDirection, BrowseResult, EndpointDescription,
    MonitoredItemCreate, MonitoredItemModify, MonitoredItemResult, MonitoringMode, ReadParams,
    ReadResult, ReadValueId, ReferenceDescription, RepublishResult, RevisedSubscription,
    SubscriptionParams, UserTokenPolicy, UserTokenType, WriteValue,
};
pub use status::{EdgeStatusCode, StatusCode, StatusEvent};
pub use variant::{EdgeArray, EdgeTypeId, EdgeVariant, TypeInfo};

/// OPC UA attribute id of the `Value` attribute.
pub const ATTRIBUTE_ID_VALUE: u32 = 13;
/// OPC UA attribute id of the `MinimumSamplingInterval` attribute.
pub const ATTRIBUTE_ID_MINIMUM_SAMPLING_INTERVAL: u32 = 19;
/// Default port an OPC UA server listens on.
pub const DEFAULT_OPC_UA_PORT: u16 = 4840;
/// Numeric node id of the `Objects` folder in namespace 0.
pub const OBJECTS_FOLDER_NODE_ID: u32 = 85;

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The message model: the transport unit crossing the adapter's queues,
//! its request and response payloads, and the convenience constructors
//! applications build messages with.
//!
//! A message is owned by whoever holds it. Crossing the queue boundary is
//! always done with a deep copy (`Clone`), so neither side can observe
//! mutation by the other.

use crate::{
    BrowseDirection, ByteString, EdgeDiagnosticInfo, EdgeNodeInfo, EdgeStatusCode, EdgeTypeId,
    EdgeVariant, EndpointInfo,
};

/// Discriminates what a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// A request with a single operand.
    SendRequest,
    /// A request with a batch of operands.
    SendRequests,
    /// Results of a Read, Write, Method or Sub operation.
    GeneralResponse,
    /// Results of a Browse operation.
    BrowseResponse,
    /// A notification from a monitored item.
    Report,
    /// A failed operation.
    Error,
}

/// The operation a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeCommand {
    /// Start a hosted server.
    StartServer,
    /// Stop a hosted server.
    StopServer,
    /// Connect a client session.
    StartClient,
    /// Disconnect a client session.
    StopClient,
    /// Read the value attribute of nodes.
    Read,
    /// Read the minimum sampling interval attribute of nodes.
    ReadSamplingInterval,
    /// Write the value attribute of nodes.
    Write,
    /// Call a method.
    Method,
    /// Create, modify, delete or republish a subscription.
    Sub,
    /// Browse references from nodes.
    Browse,
    /// Browse a view.
    BrowseView,
}

/// The four subscription sub-commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubType {
    /// Create a subscription and its monitored items.
    Create,
    /// Modify an existing subscription.
    Modify,
    /// Delete a monitored item and, when orphaned, its subscription.
    Delete,
    /// Ask the server to retransmit a notification message.
    Republish,
}

/// Intent to create, modify, delete or republish a subscription on one
/// node. For Delete and Republish only `sub_type` is meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct SubRequest {
    /// The sub-command.
    pub sub_type: SubType,
    /// Sampling interval of the monitored item, in milliseconds.
    pub sampling_interval: f64,
    /// Publishing interval of the subscription, in milliseconds.
    pub publishing_interval: f64,
    /// Keep-alive count requested for the subscription.
    pub max_keep_alive_count: u32,
    /// Lifetime count requested for the subscription.
    pub lifetime_count: u32,
    /// Cap on notifications per publish, 0 for no limit.
    pub max_notifications_per_publish: u32,
    /// Whether publishing starts enabled.
    pub publishing_enabled: bool,
    /// Priority of the subscription.
    pub priority: u8,
    /// Queue size of the monitored item.
    pub queue_size: u32,
}

impl SubRequest {
    /// A request for the given sub-command with neutral settings.
    pub fn new(sub_type: SubType) -> SubRequest {
        SubRequest {
            sub_type,
            sampling_interval: 0.0,
            publishing_interval: 0.0,
            max_keep_alive_count: 10,
            lifetime_count: 600,
            max_notifications_per_publish: 0,
            publishing_enabled: true,
            priority: 0,
            queue_size: 1,
        }
    }
}

/// Whether a method argument is a scalar or a one dimensional array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgValType {
    /// A single value.
    Scalar,
    /// A one dimensional array.
    Array1D,
}

/// One input or output argument of a method call.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodArg {
    /// Scalar type of the argument.
    pub arg_type: EdgeTypeId,
    /// Scalar or array.
    pub val_type: ArgValType,
    /// The payload.
    pub value: EdgeVariant,
}

/// Inputs and expected outputs of a method call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodParams {
    /// Arguments passed to the method.
    pub input_args: Vec<MethodArg>,
    /// Argument slots the method returns into.
    pub output_args: Vec<MethodArg>,
}

/// Browse settings carried on Browse and BrowseView messages.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseParam {
    /// Which references to follow.
    pub direction: BrowseDirection,
    /// Cap on references returned per node, 0 for no limit.
    pub max_references_per_node: u32,
}

/// One reference found by Browse, as delivered to the application.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeBrowseResult {
    /// Browse name of the target node.
    pub browse_name: String,
}

/// One element of a batch operation.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRequest {
    /// The node the operation targets.
    pub node_info: EdgeNodeInfo,
    /// The value to write, for Write.
    pub value: Option<EdgeVariant>,
    /// The subscription intent, for Sub.
    pub sub_request: Option<SubRequest>,
    /// The call arguments, for Method.
    pub method_params: Option<MethodParams>,
    /// Caller supplied correlation id echoed in responses.
    pub request_id: u32,
}

impl EdgeRequest {
    /// A request carrying only a node, as used by Read and Browse.
    pub fn new(node_info: EdgeNodeInfo) -> EdgeRequest {
        EdgeRequest {
            node_info,
            value: None,
            sub_request: None,
            method_params: None,
            request_id: 0,
        }
    }
}

/// One element of a response batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeResponse {
    /// The node the result belongs to.
    pub node_info: EdgeNodeInfo,
    /// Correlation id copied from the request element.
    pub request_id: u32,
    /// The result payload. For Error messages this is the description text.
    pub value: Option<EdgeVariant>,
    /// Diagnostics attached by the server or the adapter.
    pub diagnostic_info: Option<EdgeDiagnosticInfo>,
}

/// The transport unit crossing the send and receive queues.
///
/// `message_id` is assigned randomly at construction and preserved
/// end-to-end, so responses and errors can be correlated with the request
/// that caused them.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMessage {
    /// What the message carries.
    pub message_type: MessageType,
    /// The operation requested or responded to.
    pub command: EdgeCommand,
    /// The endpoint the operation addresses.
    pub endpoint_info: EndpointInfo,
    /// The single operand, for `SendRequest` messages.
    pub request: Option<Box<EdgeRequest>>,
    /// The operand batch, for `SendRequests` messages. `Some` with an empty
    /// vector is rejected by validation.
    pub requests: Option<Vec<EdgeRequest>>,
    /// Response elements, on response and report messages.
    pub responses: Vec<EdgeResponse>,
    /// Browse settings, required for Browse and BrowseView.
    pub browse_param: Option<BrowseParam>,
    /// Browse references, on browse response messages.
    pub browse_results: Vec<EdgeBrowseResult>,
    /// Continuation points to resume a browse from.
    pub continuation_points: Vec<ByteString>,
    /// Outcome attached to response messages.
    pub result: Option<EdgeStatusCode>,
    /// Correlation id preserved end-to-end.
    pub message_id: u32,
}

impl EdgeMessage {
    /// A message shell for the given endpoint and command, with a fresh
    /// random `message_id`.
    pub fn new(
        endpoint_info: EndpointInfo,
        command: EdgeCommand,
        message_type: MessageType,
    ) -> EdgeMessage {
        EdgeMessage {
            message_type,
            command,
            endpoint_info,
            request: None,
            requests: None,
            responses: Vec::new(),
            browse_param: None,
            browse_results: Vec::new(),
            continuation_points: Vec::new(),
            result: None,
            message_id: rand::random(),
        }
    }

    /// A client connect request.
    pub fn start_client(endpoint_uri: &str) -> EdgeMessage {
        EdgeMessage::new(
            EndpointInfo::new(endpoint_uri),
            EdgeCommand::StartClient,
            MessageType::SendRequest,
        )
    }

    /// A client disconnect request.
    pub fn stop_client(endpoint_uri: &str) -> EdgeMessage {
        EdgeMessage::new(
            EndpointInfo::new(endpoint_uri),
            EdgeCommand::StopClient,
            MessageType::SendRequest,
        )
    }

    /// A batched Read of the value attribute of `nodes`.
    pub fn read_request(endpoint_uri: &str, nodes: Vec<EdgeNodeInfo>) -> EdgeMessage {
        let mut msg = EdgeMessage::new(
            EndpointInfo::new(endpoint_uri),
            EdgeCommand::Read,
            MessageType::SendRequests,
        );
        msg.requests = Some(nodes.into_iter().map(EdgeRequest::new).collect());
        msg
    }

    /// A batched Write of values to nodes.
    pub fn write_request(
        endpoint_uri: &str,
        nodes: Vec<(EdgeNodeInfo, EdgeVariant)>,
    ) -> EdgeMessage {
        let mut msg = EdgeMessage::new(
            EndpointInfo::new(endpoint_uri),
            EdgeCommand::Write,
            MessageType::SendRequests,
        );
        msg.requests = Some(
            nodes
                .into_iter()
                .map(|(node_info, value)| EdgeRequest {
                    value: Some(value),
                    ..EdgeRequest::new(node_info)
                })
                .collect(),
        );
        msg
    }

    /// A method call against one node.
    pub fn method_request(
        endpoint_uri: &str,
        node_info: EdgeNodeInfo,
        params: MethodParams,
    ) -> EdgeMessage {
        let mut msg = EdgeMessage::new(
            EndpointInfo::new(endpoint_uri),
            EdgeCommand::Method,
            MessageType::SendRequest,
        );
        msg.request = Some(Box::new(EdgeRequest {
            method_params: Some(params),
            ..EdgeRequest::new(node_info)
        }));
        msg
    }

    /// A batched subscription operation: the same sub-request applied to
    /// each node.
    pub fn sub_request(
        endpoint_uri: &str,
        nodes: Vec<EdgeNodeInfo>,
        sub_request: SubRequest,
    ) -> EdgeMessage {
        let mut msg = EdgeMessage::new(
            EndpointInfo::new(endpoint_uri),
            EdgeCommand::Sub,
            MessageType::SendRequests,
        );
        msg.requests = Some(
            nodes
                .into_iter()
                .map(|node_info| EdgeRequest {
                    sub_request: Some(sub_request.clone()),
                    ..EdgeRequest::new(node_info)
                })
                .collect(),
        );
        msg
    }

    /// A browse request starting from `nodes`.
    pub fn browse_request(
        endpoint_uri: &str,
        nodes: Vec<EdgeNodeInfo>,
        browse_param: BrowseParam,
    ) -> EdgeMessage {
        let mut msg = EdgeMessage::new(
            EndpointInfo::new(endpoint_uri),
            EdgeCommand::Browse,
            MessageType::SendRequests,
        );
        msg.requests = Some(nodes.into_iter().map(EdgeRequest::new).collect());
        msg.browse_param = Some(browse_param);
        msg
    }

    /// The request elements regardless of single or batched form.
    pub fn request_slice(&self) -> &[EdgeRequest] {
        if let Some(requests) = &self.requests {
            requests
        } else if let Some(request) = &self.request {
            std::slice::from_ref(request.as_ref())
        } else {
            &[]
        }
    }
}

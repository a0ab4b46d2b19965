// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Records exchanged with the underlying OPC UA stack across the service
//! seam: read/write/browse operands, subscription parameters and the
//! descriptions returned by discovery.

use crate::{
    ApplicationType, ByteString, DataValue, EdgeDiagnosticInfo, EdgeNodeId, LocalizedText,
    SecurityMode, StatusCode, TimestampsToReturn,
};

/// Identifies a node attribute to read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadValueId {
    /// The node to read.
    pub node_id: EdgeNodeId,
    /// The attribute to read, e.g. [`crate::ATTRIBUTE_ID_VALUE`].
    pub attribute_id: u32,
}

/// Parameters of one Read service invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadParams {
    /// Oldest acceptable cached value, in milliseconds.
    pub max_age: f64,
    /// Which timestamps the results must carry.
    pub timestamps_to_return: TimestampsToReturn,
    /// Nodes and attributes to read.
    pub nodes_to_read: Vec<ReadValueId>,
    /// Diagnostics requested with the response; 0 requests none.
    pub return_diagnostics: u32,
}

/// Result of one Read service invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadResult {
    /// One value per requested node, in request order.
    pub results: Vec<DataValue>,
    /// Diagnostics, when the server returned any.
    pub diagnostics: Vec<EdgeDiagnosticInfo>,
}

/// A value to write to one node attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteValue {
    /// The node to write.
    pub node_id: EdgeNodeId,
    /// The attribute to write.
    pub attribute_id: u32,
    /// The value to write.
    pub value: DataValue,
}

/// Direction of a browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowseDirection {
    /// Follow forward references.
    #[default]
    Forward,
    /// Follow inverse references.
    Inverse,
    /// Follow references in both directions.
    Both,
}

/// One node to browse.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseDescription {
    /// The node to start from.
    pub node_id: EdgeNodeId,
    /// Which references to follow.
    pub direction: BrowseDirection,
}

/// A reference returned by Browse.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDescription {
    /// The target node.
    pub node_id: EdgeNodeId,
    /// Browse name of the target node.
    pub browse_name: String,
    /// Display name of the target node.
    pub display_name: LocalizedText,
    /// True if the reference is a forward reference.
    pub is_forward: bool,
}

/// Result of browsing one node.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseResult {
    /// Status of this browse operand.
    pub status: StatusCode,
    /// Opaque token to continue the browse, null when exhausted.
    pub continuation_point: ByteString,
    /// The references found.
    pub references: Vec<ReferenceDescription>,
}

/// Requested settings for a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionParams {
    /// Cyclic rate the server publishes at, in milliseconds.
    pub requested_publishing_interval: f64,
    /// Publishing intervals the subscription survives without a publish
    /// request.
    pub requested_lifetime_count: u32,
    /// Publishing intervals before an empty keep-alive is sent.
    pub requested_max_keep_alive_count: u32,
    /// Cap on notifications per publish response, 0 for no limit.
    pub max_notifications_per_publish: u32,
    /// Whether publishing starts enabled.
    pub publishing_enabled: bool,
    /// Relative priority among the session's subscriptions.
    pub priority: u8,
}

/// Settings of a subscription after the server revised them.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisedSubscription {
    /// Server assigned subscription id.
    pub subscription_id: u32,
    /// Publishing interval granted by the server.
    pub revised_publishing_interval: f64,
    /// Lifetime count granted by the server.
    pub revised_lifetime_count: u32,
    /// Keep-alive count granted by the server.
    pub revised_max_keep_alive_count: u32,
}

/// Monitoring mode of a monitored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringMode {
    /// The item is not sampled.
    Disabled,
    /// The item is sampled but notifications are not reported.
    Sampling,
    /// The item is sampled and notifications are reported.
    Reporting,
}

/// A monitored item to create.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItemCreate {
    /// The node and attribute to monitor.
    pub item_to_monitor: ReadValueId,
    /// Sampling interval in milliseconds.
    pub sampling_interval: f64,
    /// Length of the server side notification queue.
    pub queue_size: u32,
    /// Whether the oldest notification is discarded on queue overflow.
    pub discard_oldest: bool,
    /// Client supplied handle echoed in notifications.
    pub client_handle: u32,
}

/// A monitored item to modify.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItemModify {
    /// Server assigned id of the item.
    pub monitored_item_id: u32,
    /// New sampling interval in milliseconds.
    pub sampling_interval: f64,
    /// New queue length.
    pub queue_size: u32,
    /// Whether the oldest notification is discarded on queue overflow.
    pub discard_oldest: bool,
    /// Client supplied handle.
    pub client_handle: u32,
}

/// Per item result of creating or modifying monitored items.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItemResult {
    /// Status of this item.
    pub status: StatusCode,
    /// Server assigned id, 0 when creation failed.
    pub monitored_item_id: u32,
    /// Sampling interval granted by the server.
    pub revised_sampling_interval: f64,
    /// Queue size granted by the server.
    pub revised_queue_size: u32,
}

/// Result of a Republish service invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RepublishResult {
    /// Sequence number of the retransmitted notification message.
    pub sequence_number: u32,
    /// Number of notifications in the retransmitted message.
    pub notification_count: usize,
}

/// How a user may authenticate against an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserTokenType {
    /// No credentials.
    #[default]
    Anonymous,
    /// User name and password.
    UserName,
    /// X509 certificate.
    Certificate,
    /// Token issued by an external authority.
    IssuedToken,
}

/// A user identity token policy advertised by an endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserTokenPolicy {
    /// Identifier of the policy within the endpoint.
    pub policy_id: String,
    /// The kind of token the policy accepts.
    pub token_type: UserTokenType,
    /// The type of issued token, required when `token_type` is
    /// `IssuedToken`.
    pub issued_token_type: String,
    /// Endpoint of the authority issuing tokens.
    pub issuer_endpoint_url: String,
    /// Security policy applied to the token.
    pub security_policy_uri: String,
}

/// Description of an application, as returned by FindServers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplicationDescription {
    /// Globally unique identifier of the application.
    pub application_uri: String,
    /// Globally unique identifier of the product.
    pub product_uri: String,
    /// Human readable name of the application.
    pub application_name: LocalizedText,
    /// The role the application plays.
    pub application_type: ApplicationType,
    /// URI of the gateway server, empty when not applicable.
    pub gateway_server_uri: String,
    /// URI of the discovery profile, empty when not applicable.
    pub discovery_profile_uri: String,
    /// URLs the application can be discovered on.
    pub discovery_urls: Vec<String>,
}

impl ApplicationDescription {
    /// True when every field still carries its zero value, which marks a
    /// description the server never filled in.
    pub fn is_zero_valued(&self) -> bool {
        self == &ApplicationDescription::default()
    }
}

/// Description of an endpoint, as returned by GetEndpoints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndpointDescription {
    /// URL of the endpoint.
    pub endpoint_url: String,
    /// The application hosting the endpoint.
    pub server: ApplicationDescription,
    /// Security mode of the endpoint.
    pub security_mode: SecurityMode,
    /// URI of the security policy.
    pub security_policy_uri: String,
    /// The user identity token policies the endpoint accepts.
    pub user_identity_tokens: Vec<UserTokenPolicy>,
    /// URI of the transport profile.
    pub transport_profile_uri: String,
    /// Relative security level assigned by the server.
    pub security_level: u8,
}

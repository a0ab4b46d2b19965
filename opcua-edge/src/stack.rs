// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The seam to the underlying OPC UA stack.
//!
//! The adapter performs no framing, security or encoding of its own.
//! Everything below the service level is reached through these traits; a
//! production deployment implements them over a full OPC UA stack, tests
//! implement them with scripted fakes.

use std::sync::Arc;

use async_trait::async_trait;
use opcua_edge_types::{
    ApplicationDescription, BrowseDescription, BrowseResult, ByteString, DataValue, EdgeNodeId,
    EdgeVariant, EndpointDescription, MonitoredItemCreate, MonitoredItemModify,
    MonitoredItemResult, MonitoringMode, ReadParams, ReadResult, RepublishResult,
    RevisedSubscription, StatusCode, SubscriptionParams, WriteValue,
};

/// Receives data change notifications for the monitored items of one
/// subscription. Installed when the items are created; invoked by the
/// stack once per delivered value, in channel order.
pub type NotificationSink = Arc<dyn Fn(u32, DataValue) + Send + Sync>;

/// Entry point into the stack: session establishment and the discovery
/// services that run on a transient connection.
#[async_trait]
pub trait UaConnector: Send + Sync + 'static {
    /// Opens and activates a session against the endpoint.
    async fn connect(&self, endpoint_uri: &str) -> Result<Arc<dyn UaSession>, StatusCode>;

    /// Asks the server for the endpoints it offers.
    async fn get_endpoints(&self, endpoint_uri: &str)
        -> Result<Vec<EndpointDescription>, StatusCode>;

    /// Asks a discovery server for the applications it knows.
    async fn find_servers(
        &self,
        endpoint_uri: &str,
        server_uris: &[String],
        locale_ids: &[String],
    ) -> Result<Vec<ApplicationDescription>, StatusCode>;
}

/// An activated session. Calls are issued one at a time per session by the
/// send queue worker; only [`UaSession::publish`] is additionally driven
/// from the session's publish task.
#[async_trait]
pub trait UaSession: Send + Sync + 'static {
    /// Closes the session.
    async fn disconnect(&self) -> Result<(), StatusCode>;

    /// Reads node attributes in one batch.
    async fn read(&self, params: ReadParams) -> Result<ReadResult, StatusCode>;

    /// Writes node attributes in one batch, returning one status per
    /// operand.
    async fn write(&self, nodes_to_write: Vec<WriteValue>) -> Result<Vec<StatusCode>, StatusCode>;

    /// Calls a method on an object, returning its output arguments.
    async fn call(
        &self,
        object_id: EdgeNodeId,
        method_id: EdgeNodeId,
        input_args: Vec<EdgeVariant>,
    ) -> Result<Vec<EdgeVariant>, StatusCode>;

    /// Browses references from the given nodes.
    async fn browse(
        &self,
        nodes_to_browse: Vec<BrowseDescription>,
        max_references_per_node: u32,
    ) -> Result<Vec<BrowseResult>, StatusCode>;

    /// Continues browses from earlier continuation points.
    async fn browse_next(
        &self,
        continuation_points: Vec<ByteString>,
        release_continuation_points: bool,
    ) -> Result<Vec<BrowseResult>, StatusCode>;

    /// Creates a subscription.
    async fn create_subscription(
        &self,
        params: SubscriptionParams,
    ) -> Result<RevisedSubscription, StatusCode>;

    /// Adds monitored items to a subscription. The sink is retained by the
    /// stack and invoked for every delivered data change.
    async fn add_monitored_items(
        &self,
        subscription_id: u32,
        items: Vec<MonitoredItemCreate>,
        sink: NotificationSink,
    ) -> Result<Vec<MonitoredItemResult>, StatusCode>;

    /// Modifies a subscription's settings.
    async fn modify_subscription(
        &self,
        subscription_id: u32,
        params: SubscriptionParams,
    ) -> Result<RevisedSubscription, StatusCode>;

    /// Modifies monitored items of a subscription.
    async fn modify_monitored_items(
        &self,
        subscription_id: u32,
        items: Vec<MonitoredItemModify>,
    ) -> Result<Vec<MonitoredItemResult>, StatusCode>;

    /// Sets the monitoring mode of monitored items.
    async fn set_monitoring_mode(
        &self,
        subscription_id: u32,
        monitored_item_ids: Vec<u32>,
        monitoring_mode: MonitoringMode,
    ) -> Result<Vec<StatusCode>, StatusCode>;

    /// Enables or disables publishing of subscriptions.
    async fn set_publishing_mode(
        &self,
        subscription_ids: Vec<u32>,
        publishing_enabled: bool,
    ) -> Result<Vec<StatusCode>, StatusCode>;

    /// Removes one monitored item from a subscription.
    async fn delete_monitored_item(
        &self,
        subscription_id: u32,
        monitored_item_id: u32,
    ) -> Result<(), StatusCode>;

    /// Removes a subscription.
    async fn delete_subscription(&self, subscription_id: u32) -> Result<(), StatusCode>;

    /// Asks the server to retransmit a notification message.
    async fn republish(
        &self,
        subscription_id: u32,
        retransmit_sequence_number: u32,
    ) -> Result<RepublishResult, StatusCode>;

    /// Issues one publish request, delivering pending notifications to the
    /// installed sinks.
    async fn publish(&self) -> Result<(), StatusCode>;
}

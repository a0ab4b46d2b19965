//! Shared fixtures: a scripted stack implementation and channel backed
//! callbacks, so tests can drive the adapter end to end without a real
//! OPC UA server.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opcua_edge::types::{
    ApplicationDescription, ApplicationTypeMask, BrowseDescription, BrowseResult, ByteString,
    DataValue, Device, EdgeMessage, EdgeNodeId, EdgeVariant, EndpointDescription, Identifier,
    MonitoredItemCreate, MonitoredItemModify, MonitoredItemResult, MonitoringMode, ReadParams,
    ReadResult, RepublishResult, RevisedSubscription, StatusCode, StatusEvent, SubscriptionParams,
    WriteValue,
};
use opcua_edge::{
    DiscoveryCallbacks, EdgeConfigure, EdgeManager, NotificationSink, ResponseCallbacks,
    StatusCallbacks, UaConnector, UaSession,
};
use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Which callback leaf delivered a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(unused)]
pub enum CallbackKind {
    Response,
    Browse,
    Report,
    Error,
}

#[derive(Default)]
pub struct MockSession {
    pub read_results: Mutex<VecDeque<Result<ReadResult, StatusCode>>>,
    pub write_results: Mutex<VecDeque<Result<Vec<StatusCode>, StatusCode>>>,
    pub call_results: Mutex<VecDeque<Result<Vec<EdgeVariant>, StatusCode>>>,
    pub browse_results: Mutex<VecDeque<Result<Vec<BrowseResult>, StatusCode>>>,
    pub republish_results: Mutex<VecDeque<Result<RepublishResult, StatusCode>>>,
    pub publish_count: AtomicUsize,
    pub disconnect_count: AtomicUsize,
    pub deleted_subscriptions: Mutex<Vec<u32>>,
    pub deleted_monitored_items: Mutex<Vec<(u32, u32)>>,
    pub modified_subscriptions: Mutex<Vec<(u32, SubscriptionParams)>>,
    next_subscription_id: AtomicU32,
    next_monitored_item_id: AtomicU32,
    // One sink per created batch, with the item ids it serves.
    sinks: Mutex<Vec<(Vec<u32>, NotificationSink)>>,
    items: Mutex<Vec<(String, u32)>>,
}

impl MockSession {
    pub fn new() -> Arc<MockSession> {
        Arc::new(MockSession {
            next_subscription_id: AtomicU32::new(1),
            next_monitored_item_id: AtomicU32::new(100),
            ..Default::default()
        })
    }

    /// Server assigned id of the monitored item created for `alias`.
    pub fn item_id(&self, alias: &str) -> Option<u32> {
        self.items
            .lock()
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, id)| *id)
    }

    /// Number of installed notification sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.lock().len()
    }

    /// Delivers a data change for the item, as the publish channel would.
    pub fn notify(&self, monitored_item_id: u32, value: DataValue) {
        let sinks = self.sinks.lock();
        for (ids, sink) in sinks.iter() {
            if ids.contains(&monitored_item_id) {
                sink(monitored_item_id, value.clone());
                return;
            }
        }
    }

    fn alias_of(node_id: &EdgeNodeId) -> String {
        match &node_id.identifier {
            Identifier::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl UaSession for MockSession {
    async fn disconnect(&self) -> Result<(), StatusCode> {
        self.disconnect_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read(&self, _params: ReadParams) -> Result<ReadResult, StatusCode> {
        self.read_results
            .lock()
            .pop_front()
            .unwrap_or(Err(StatusCode::BadUnexpectedError))
    }

    async fn write(&self, _nodes_to_write: Vec<WriteValue>) -> Result<Vec<StatusCode>, StatusCode> {
        self.write_results
            .lock()
            .pop_front()
            .unwrap_or(Err(StatusCode::BadUnexpectedError))
    }

    async fn call(
        &self,
        _object_id: EdgeNodeId,
        _method_id: EdgeNodeId,
        _input_args: Vec<EdgeVariant>,
    ) -> Result<Vec<EdgeVariant>, StatusCode> {
        self.call_results
            .lock()
            .pop_front()
            .unwrap_or(Err(StatusCode::BadUnexpectedError))
    }

    async fn browse(
        &self,
        _nodes_to_browse: Vec<BrowseDescription>,
        _max_references_per_node: u32,
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        self.browse_results
            .lock()
            .pop_front()
            .unwrap_or(Err(StatusCode::BadUnexpectedError))
    }

    async fn browse_next(
        &self,
        _continuation_points: Vec<ByteString>,
        _release_continuation_points: bool,
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        self.browse_results
            .lock()
            .pop_front()
            .unwrap_or(Err(StatusCode::BadUnexpectedError))
    }

    async fn create_subscription(
        &self,
        params: SubscriptionParams,
    ) -> Result<RevisedSubscription, StatusCode> {
        let subscription_id = self.next_subscription_id.fetch_add(1, Ordering::SeqCst);
        Ok(RevisedSubscription {
            subscription_id,
            revised_publishing_interval: params.requested_publishing_interval,
            revised_lifetime_count: params.requested_lifetime_count,
            revised_max_keep_alive_count: params.requested_max_keep_alive_count,
        })
    }

    async fn add_monitored_items(
        &self,
        _subscription_id: u32,
        items: Vec<MonitoredItemCreate>,
        sink: NotificationSink,
    ) -> Result<Vec<MonitoredItemResult>, StatusCode> {
        let mut results = Vec::new();
        let mut ids = Vec::new();
        for item in &items {
            let id = self.next_monitored_item_id.fetch_add(1, Ordering::SeqCst);
            self.items
                .lock()
                .push((Self::alias_of(&item.item_to_monitor.node_id), id));
            ids.push(id);
            results.push(MonitoredItemResult {
                status: StatusCode::Good,
                monitored_item_id: id,
                revised_sampling_interval: item.sampling_interval,
                revised_queue_size: item.queue_size,
            });
        }
        self.sinks.lock().push((ids, sink));
        Ok(results)
    }

    async fn modify_subscription(
        &self,
        subscription_id: u32,
        params: SubscriptionParams,
    ) -> Result<RevisedSubscription, StatusCode> {
        self.modified_subscriptions
            .lock()
            .push((subscription_id, params.clone()));
        Ok(RevisedSubscription {
            subscription_id,
            revised_publishing_interval: params.requested_publishing_interval,
            revised_lifetime_count: params.requested_lifetime_count,
            revised_max_keep_alive_count: params.requested_max_keep_alive_count,
        })
    }

    async fn modify_monitored_items(
        &self,
        _subscription_id: u32,
        items: Vec<MonitoredItemModify>,
    ) -> Result<Vec<MonitoredItemResult>, StatusCode> {
        Ok(items
            .iter()
            .map(|item| MonitoredItemResult {
                status: StatusCode::Good,
                monitored_item_id: item.monitored_item_id,
                revised_sampling_interval: item.sampling_interval,
                revised_queue_size: item.queue_size,
            })
            .collect())
    }

    async fn set_monitoring_mode(
        &self,
        _subscription_id: u32,
        monitored_item_ids: Vec<u32>,
        _monitoring_mode: MonitoringMode,
    ) -> Result<Vec<StatusCode>, StatusCode> {
        Ok(vec![StatusCode::Good; monitored_item_ids.len()])
    }

    async fn set_publishing_mode(
        &self,
        subscription_ids: Vec<u32>,
        _publishing_enabled: bool,
    ) -> Result<Vec<StatusCode>, StatusCode> {
        Ok(vec![StatusCode::Good; subscription_ids.len()])
    }

    async fn delete_monitored_item(
        &self,
        subscription_id: u32,
        monitored_item_id: u32,
    ) -> Result<(), StatusCode> {
        self.deleted_monitored_items
            .lock()
            .push((subscription_id, monitored_item_id));
        Ok(())
    }

    async fn delete_subscription(&self, subscription_id: u32) -> Result<(), StatusCode> {
        self.deleted_subscriptions.lock().push(subscription_id);
        Ok(())
    }

    async fn republish(
        &self,
        _subscription_id: u32,
        retransmit_sequence_number: u32,
    ) -> Result<RepublishResult, StatusCode> {
        self.republish_results
            .lock()
            .pop_front()
            .unwrap_or(Ok(RepublishResult {
                sequence_number: retransmit_sequence_number,
                notification_count: 0,
            }))
    }

    async fn publish(&self) -> Result<(), StatusCode> {
        self.publish_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockConnector {
    pub session: Mutex<Option<Arc<MockSession>>>,
    pub connect_status: Mutex<Option<StatusCode>>,
    pub connect_count: AtomicUsize,
    pub endpoints: Mutex<Vec<EndpointDescription>>,
    pub servers: Mutex<Vec<ApplicationDescription>>,
}

impl MockConnector {
    pub fn with_session(session: Arc<MockSession>) -> Arc<MockConnector> {
        Arc::new(MockConnector {
            session: Mutex::new(Some(session)),
            ..Default::default()
        })
    }
}

#[async_trait]
impl UaConnector for MockConnector {
    async fn connect(&self, _endpoint_uri: &str) -> Result<Arc<dyn UaSession>, StatusCode> {
        if let Some(status) = *self.connect_status.lock() {
            return Err(status);
        }
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        let session = self.session.lock().clone().expect("no session scripted");
        Ok(session)
    }

    async fn get_endpoints(
        &self,
        _endpoint_uri: &str,
    ) -> Result<Vec<EndpointDescription>, StatusCode> {
        Ok(self.endpoints.lock().clone())
    }

    async fn find_servers(
        &self,
        _endpoint_uri: &str,
        _server_uris: &[String],
        _locale_ids: &[String],
    ) -> Result<Vec<ApplicationDescription>, StatusCode> {
        Ok(self.servers.lock().clone())
    }
}

pub struct Harness {
    pub manager: EdgeManager,
    pub connector: Arc<MockConnector>,
    pub session: Arc<MockSession>,
    pub messages: UnboundedReceiver<(CallbackKind, EdgeMessage)>,
    pub status: UnboundedReceiver<(StatusEvent, String)>,
    pub devices: UnboundedReceiver<Device>,
}

fn channel_callbacks(
    tx: UnboundedSender<(CallbackKind, EdgeMessage)>,
) -> Arc<ResponseCallbacks> {
    let send = move |kind: CallbackKind| {
        let tx = tx.clone();
        move |msg: &EdgeMessage| {
            let _ = tx.send((kind, msg.clone()));
        }
    };
    Arc::new(ResponseCallbacks::new(
        send(CallbackKind::Response),
        send(CallbackKind::Browse),
        send(CallbackKind::Report),
        send(CallbackKind::Error),
    ))
}

/// A configured adapter over a fresh mock stack, accepting every
/// application type.
pub fn setup() -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let session = MockSession::new();
    let connector = MockConnector::with_session(session.clone());
    let manager = EdgeManager::new(connector.clone());

    let (msg_tx, messages) = unbounded_channel();
    let (status_tx, status) = unbounded_channel();
    let (device_tx, devices) = unbounded_channel();

    let status_send = move |endpoint: &opcua_edge::types::EndpointInfo, event: StatusEvent| {
        let _ = status_tx.send((event, endpoint.endpoint_uri.clone()));
    };
    let s1 = status_send.clone();
    let s2 = status_send.clone();
    let s3 = status_send;

    manager.configure(EdgeConfigure {
        recv_callback: channel_callbacks(msg_tx),
        status_callback: Arc::new(StatusCallbacks::new(
            move |e, s| s1(e, s),
            move |e, s| s2(e, s),
            move |e, s| s3(e, s),
        )),
        discovery_callback: Arc::new(DiscoveryCallbacks::new(move |device: &Device| {
            let _ = device_tx.send(device.clone());
        })),
        supported_application_types: ApplicationTypeMask::all(),
    });

    Harness {
        manager,
        connector,
        session,
        messages,
        status,
        devices,
    }
}

impl Harness {
    /// Connects a client session and waits for the lifecycle event.
    pub async fn connect(&mut self, endpoint_uri: &str) {
        self.manager
            .send_request(&EdgeMessage::start_client(endpoint_uri))
            .unwrap();
        let (event, _) = self.next_status().await;
        assert_eq!(event, StatusEvent::ClientStarted);
    }

    /// The next message delivered through the response callbacks.
    pub async fn next_message(&mut self) -> (CallbackKind, EdgeMessage) {
        timeout(TEST_TIMEOUT, self.messages.recv())
            .await
            .expect("timed out waiting for a callback")
            .expect("callback channel closed")
    }

    /// The next lifecycle event.
    pub async fn next_status(&mut self) -> (StatusEvent, String) {
        timeout(TEST_TIMEOUT, self.status.recv())
            .await
            .expect("timed out waiting for a status event")
            .expect("status channel closed")
    }

    /// True if no callback is pending right now.
    pub fn no_pending_message(&mut self) -> bool {
        self.messages.try_recv().is_err()
    }
}

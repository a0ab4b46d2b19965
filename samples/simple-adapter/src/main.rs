//! Drives the adapter against a tiny in-memory stack: connect, write,
//! read, subscribe, watch a few reports come in, disconnect.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use opcua_edge::types::{
    ApplicationDescription, ApplicationTypeMask, BrowseDescription, BrowseResult, ByteString,
    DataValue, EdgeMessage, EdgeNodeId, EdgeNodeInfo, EdgeVariant, EndpointDescription,
    Identifier, MonitoredItemCreate, MonitoredItemModify, MonitoredItemResult, MonitoringMode,
    ReadParams, ReadResult, RepublishResult, RevisedSubscription, StatusCode, SubRequest, SubType,
    SubscriptionParams, UaDateTime, WriteValue,
};
use opcua_edge::{
    DiscoveryCallbacks, EdgeConfigure, EdgeManager, NotificationSink, ResponseCallbacks,
    StatusCallbacks, UaConnector, UaSession,
};
use parking_lot::Mutex;

const ENDPOINT: &str = "opc.tcp://localhost:4840";

/// A stack whose server side is a map of variables.
#[derive(Default)]
struct DemoStack {
    variables: Mutex<HashMap<String, EdgeVariant>>,
    monitored: Mutex<Vec<(u32, String, NotificationSink)>>,
    next_id: AtomicU32,
}

impl DemoStack {
    fn alias_of(node_id: &EdgeNodeId) -> String {
        match &node_id.identifier {
            Identifier::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl UaConnector for DemoStack {
    async fn connect(&self, endpoint_uri: &str) -> Result<Arc<dyn UaSession>, StatusCode> {
        info!("demo stack connecting to {endpoint_uri}");
        Ok(Arc::new(DemoSession {
            stack: Arc::new(DemoStack {
                variables: Mutex::new(self.variables.lock().clone()),
                monitored: Mutex::new(Vec::new()),
                next_id: AtomicU32::new(1),
            }),
        }))
    }

    async fn get_endpoints(
        &self,
        _endpoint_uri: &str,
    ) -> Result<Vec<EndpointDescription>, StatusCode> {
        Ok(vec![])
    }

    async fn find_servers(
        &self,
        _endpoint_uri: &str,
        _server_uris: &[String],
        _locale_ids: &[String],
    ) -> Result<Vec<ApplicationDescription>, StatusCode> {
        Ok(vec![])
    }
}

struct DemoSession {
    stack: Arc<DemoStack>,
}

#[async_trait]
impl UaSession for DemoSession {
    async fn disconnect(&self) -> Result<(), StatusCode> {
        Ok(())
    }

    async fn read(&self, params: ReadParams) -> Result<ReadResult, StatusCode> {
        let variables = self.stack.variables.lock();
        let now = UaDateTime::now();
        let results = params
            .nodes_to_read
            .iter()
            .map(|node| {
                match variables.get(&DemoStack::alias_of(&node.node_id)) {
                    Some(value) => DataValue::new_at(value.clone(), now),
                    None => DataValue::new_status(StatusCode::BadNodeIdUnknown),
                }
            })
            .collect();
        Ok(ReadResult {
            results,
            diagnostics: vec![],
        })
    }

    async fn write(&self, nodes_to_write: Vec<WriteValue>) -> Result<Vec<StatusCode>, StatusCode> {
        let mut variables = self.stack.variables.lock();
        Ok(nodes_to_write
            .into_iter()
            .map(|node| {
                let alias = DemoStack::alias_of(&node.node_id);
                match node.value.value {
                    Some(value) => {
                        variables.insert(alias, value);
                        StatusCode::Good
                    }
                    None => StatusCode::BadInvalidArgument,
                }
            })
            .collect())
    }

    async fn call(
        &self,
        _object_id: EdgeNodeId,
        _method_id: EdgeNodeId,
        input_args: Vec<EdgeVariant>,
    ) -> Result<Vec<EdgeVariant>, StatusCode> {
        // Echo, the hello world of method calls.
        Ok(input_args)
    }

    async fn browse(
        &self,
        _nodes_to_browse: Vec<BrowseDescription>,
        _max_references_per_node: u32,
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        Err(StatusCode::BadServiceUnsupported)
    }

    async fn browse_next(
        &self,
        _continuation_points: Vec<ByteString>,
        _release_continuation_points: bool,
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        Err(StatusCode::BadServiceUnsupported)
    }

    async fn create_subscription(
        &self,
        _params: SubscriptionParams,
    ) -> Result<RevisedSubscription, StatusCode> {
        Ok(RevisedSubscription {
            subscription_id: self.stack.next_id.fetch_add(1, Ordering::SeqCst),
            revised_publishing_interval: 100.0,
            revised_lifetime_count: 600,
            revised_max_keep_alive_count: 20,
        })
    }

    async fn add_monitored_items(
        &self,
        _subscription_id: u32,
        items: Vec<MonitoredItemCreate>,
        sink: NotificationSink,
    ) -> Result<Vec<MonitoredItemResult>, StatusCode> {
        let mut monitored = self.stack.monitored.lock();
        Ok(items
            .iter()
            .map(|item| {
                let id = self.stack.next_id.fetch_add(1, Ordering::SeqCst);
                monitored.push((
                    id,
                    DemoStack::alias_of(&item.item_to_monitor.node_id),
                    sink.clone(),
                ));
                MonitoredItemResult {
                    status: StatusCode::Good,
                    monitored_item_id: id,
                    revised_sampling_interval: item.sampling_interval,
                    revised_queue_size: item.queue_size,
                }
            })
            .collect())
    }

    async fn modify_subscription(
        &self,
        subscription_id: u32,
        params: SubscriptionParams,
    ) -> Result<RevisedSubscription, StatusCode> {
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
        _subscription_id: u32,
        monitored_item_id: u32,
    ) -> Result<(), StatusCode> {
        self.stack
            .monitored
            .lock()
            .retain(|(id, _, _)| *id != monitored_item_id);
        Ok(())
    }

    async fn delete_subscription(&self, _subscription_id: u32) -> Result<(), StatusCode> {
        Ok(())
    }

    async fn republish(
        &self,
        _subscription_id: u32,
        retransmit_sequence_number: u32,
    ) -> Result<RepublishResult, StatusCode> {
        Ok(RepublishResult {
            sequence_number: retransmit_sequence_number,
            notification_count: 0,
        })
    }

    async fn publish(&self) -> Result<(), StatusCode> {
        // Deliver the current value of every monitored item.
        let monitored = self.stack.monitored.lock().clone();
        let variables = self.stack.variables.lock().clone();
        for (id, alias, sink) in &monitored {
            if let Some(value) = variables.get(alias) {
                sink(*id, DataValue::new_at(value.clone(), UaDateTime::now()));
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let stack = Arc::new(DemoStack::default());
    stack
        .variables
        .lock()
        .insert("Counter".to_string(), EdgeVariant::Int32(0));

    let manager = EdgeManager::new(stack);
    manager.configure(EdgeConfigure {
        recv_callback: Arc::new(ResponseCallbacks::new(
            |msg| {
                for response in &msg.responses {
                    println!(
                        "response for {}: {:?}",
                        response.node_info.value_alias, response.value
                    );
                }
            },
            |msg| println!("browse results: {:?}", msg.browse_results),
            |msg| {
                for response in &msg.responses {
                    println!(
                        "report for {}: {:?}",
                        response.node_info.value_alias, response.value
                    );
                }
            },
            |msg| println!("error: {:?}", msg.responses.first().and_then(|r| r.value.clone())),
        )),
        status_callback: Arc::new(StatusCallbacks::new(
            |endpoint, status| println!("{status:?} for {}", endpoint.endpoint_uri),
            |endpoint, status| println!("{status:?} for {}", endpoint.endpoint_uri),
            |_, status| println!("network: {status:?}"),
        )),
        discovery_callback: Arc::new(DiscoveryCallbacks::new(|device| {
            println!("found {} endpoints at {}", device.endpoints.len(), device.address)
        })),
        supported_application_types: ApplicationTypeMask::all(),
    });

    manager
        .send_request(&EdgeMessage::start_client(ENDPOINT))
        .expect("connect request");
    manager
        .send_request(&EdgeMessage::write_request(
            ENDPOINT,
            vec![(EdgeNodeInfo::new(2, "Counter"), EdgeVariant::Int32(42))],
        ))
        .expect("write request");
    manager
        .send_request(&EdgeMessage::read_request(
            ENDPOINT,
            vec![EdgeNodeInfo::new(2, "Counter")],
        ))
        .expect("read request");
    manager
        .send_request(&EdgeMessage::sub_request(
            ENDPOINT,
            vec![EdgeNodeInfo::new(2, "Counter")],
            SubRequest {
                publishing_interval: 100.0,
                sampling_interval: 100.0,
                ..SubRequest::new(SubType::Create)
            },
        ))
        .expect("subscribe request");

    // Let a few publish cycles deliver reports.
    tokio::time::sleep(Duration::from_millis(500)).await;

    manager
        .send_request(&EdgeMessage::stop_client(ENDPOINT))
        .expect("disconnect request");
    tokio::time::sleep(Duration::from_millis(100)).await;
    manager.shutdown().await;
}

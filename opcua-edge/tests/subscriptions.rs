//! End to end tests of the subscription lifecycle: create, notify,
//! modify, delete, republish, and the publish task.

mod utils;

use std::sync::atomic::Ordering;
use std::time::Duration;

use opcua_edge::types::{
    DataValue, EdgeMessage, EdgeNodeInfo, EdgeStatusCode, EdgeVariant, MessageType, StatusCode,
    SubRequest, SubType,
};
use utils::{setup, CallbackKind};

const ENDPOINT: &str = "opc.tcp://host:4840";

fn create_request(aliases: &[&str]) -> EdgeMessage {
    let sub = SubRequest {
        publishing_interval: 500.0,
        sampling_interval: 250.0,
        queue_size: 1,
        ..SubRequest::new(SubType::Create)
    };
    EdgeMessage::sub_request(
        ENDPOINT,
        aliases.iter().map(|a| EdgeNodeInfo::new(2, a)).collect(),
        sub,
    )
}

#[tokio::test]
async fn subscribe_then_notify_delivers_a_report() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    let request = create_request(&["Temp"]);
    harness.manager.send_request(&request).unwrap();
    let (kind, ack) = harness.next_message().await;
    assert_eq!(kind, CallbackKind::Response);
    assert_eq!(ack.message_id, request.message_id);

    let item_id = harness.session.item_id("Temp").expect("item was created");
    harness
        .session
        .notify(item_id, DataValue::new(EdgeVariant::Double(21.5)));

    let (kind, report) = harness.next_message().await;
    assert_eq!(kind, CallbackKind::Report);
    assert_eq!(report.message_type, MessageType::Report);
    assert_eq!(report.responses.len(), 1);
    assert_eq!(report.responses[0].node_info.value_alias, "Temp");
    assert_eq!(report.responses[0].value, Some(EdgeVariant::Double(21.5)));
    assert!(!report.responses[0].value.as_ref().unwrap().is_array());
}

#[tokio::test]
async fn bad_quality_notifications_are_dropped() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    harness.manager.send_request(&create_request(&["Temp"])).unwrap();
    harness.next_message().await;

    let item_id = harness.session.item_id("Temp").unwrap();
    harness.session.notify(
        item_id,
        DataValue {
            value: Some(EdgeVariant::Double(1.0)),
            status: StatusCode::BadCommunicationError,
            source_timestamp: None,
            server_timestamp: None,
        },
    );
    harness
        .session
        .notify(item_id, DataValue::new_status(StatusCode::Good));

    // Neither the bad-quality nor the value-less notification makes it out.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.no_pending_message());
}

#[tokio::test]
async fn duplicate_aliases_in_one_batch_are_rejected() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    let request = create_request(&["Temp", "Temp"]);
    harness.manager.send_request(&request).unwrap();

    let (kind, msg) = harness.next_message().await;
    assert_eq!(kind, CallbackKind::Error);
    assert_eq!(msg.message_id, request.message_id);
    assert_eq!(
        msg.result,
        Some(EdgeStatusCode::Service(
            StatusCode::BadRequestCancelledByClient
        ))
    );
    // Nothing was created and no publish task was spawned.
    assert_eq!(harness.session.sink_count(), 0);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(harness.session.publish_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn resubscribing_a_live_alias_is_rejected() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    harness.manager.send_request(&create_request(&["Temp"])).unwrap();
    harness.next_message().await;

    harness.manager.send_request(&create_request(&["Temp"])).unwrap();
    let (kind, msg) = harness.next_message().await;
    assert_eq!(kind, CallbackKind::Error);
    assert_eq!(
        msg.result,
        Some(EdgeStatusCode::Service(
            StatusCode::BadRequestCancelledByClient
        ))
    );
}

#[tokio::test]
async fn publish_task_runs_while_items_exist() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    harness.manager.send_request(&create_request(&["Temp"])).unwrap();
    harness.next_message().await;

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(harness.session.publish_count.load(Ordering::SeqCst) > 0);

    let delete = EdgeMessage::sub_request(
        ENDPOINT,
        vec![EdgeNodeInfo::new(2, "Temp")],
        SubRequest::new(SubType::Delete),
    );
    harness.manager.send_request(&delete).unwrap();
    let (kind, _) = harness.next_message().await;
    assert_eq!(kind, CallbackKind::Response);
    assert_eq!(harness.session.deleted_subscriptions.lock().len(), 1);

    // The publish task was joined; the counter must stop moving.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let settled = harness.session.publish_count.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(harness.session.publish_count.load(Ordering::SeqCst), settled);
}

#[tokio::test]
async fn operations_on_unknown_aliases_return_bad_no_subscription() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    for sub_type in [SubType::Modify, SubType::Delete, SubType::Republish] {
        let request = EdgeMessage::sub_request(
            ENDPOINT,
            vec![EdgeNodeInfo::new(2, "Nowhere")],
            SubRequest::new(sub_type),
        );
        harness.manager.send_request(&request).unwrap();
        let (kind, msg) = harness.next_message().await;
        assert_eq!(kind, CallbackKind::Error);
        assert_eq!(
            msg.result,
            Some(EdgeStatusCode::Service(StatusCode::BadNoSubscription)),
            "{sub_type:?} on an unknown alias"
        );
    }
}

#[tokio::test]
async fn deleted_alias_cannot_be_modified_again() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    harness.manager.send_request(&create_request(&["Temp"])).unwrap();
    harness.next_message().await;

    let delete = EdgeMessage::sub_request(
        ENDPOINT,
        vec![EdgeNodeInfo::new(2, "Temp")],
        SubRequest::new(SubType::Delete),
    );
    harness.manager.send_request(&delete).unwrap();
    harness.next_message().await;

    let modify = EdgeMessage::sub_request(
        ENDPOINT,
        vec![EdgeNodeInfo::new(2, "Temp")],
        SubRequest::new(SubType::Modify),
    );
    harness.manager.send_request(&modify).unwrap();
    let (kind, msg) = harness.next_message().await;
    assert_eq!(kind, CallbackKind::Error);
    assert_eq!(
        msg.result,
        Some(EdgeStatusCode::Service(StatusCode::BadNoSubscription))
    );
}

#[tokio::test]
async fn modify_round_trips_the_requested_settings() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    harness.manager.send_request(&create_request(&["Temp"])).unwrap();
    harness.next_message().await;

    let modify = EdgeMessage::sub_request(
        ENDPOINT,
        vec![EdgeNodeInfo::new(2, "Temp")],
        SubRequest {
            publishing_interval: 1000.0,
            sampling_interval: 500.0,
            ..SubRequest::new(SubType::Modify)
        },
    );
    harness.manager.send_request(&modify).unwrap();
    let (kind, _) = harness.next_message().await;
    assert_eq!(kind, CallbackKind::Response);

    let modified = harness.session.modified_subscriptions.lock();
    assert_eq!(modified.len(), 1);
    assert_eq!(modified[0].1.requested_publishing_interval, 1000.0);
}

#[tokio::test]
async fn republish_tolerates_message_not_available() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    harness.manager.send_request(&create_request(&["Temp"])).unwrap();
    harness.next_message().await;

    harness
        .session
        .republish_results
        .lock()
        .push_back(Err(StatusCode::BadMessageNotAvailable));
    let republish = EdgeMessage::sub_request(
        ENDPOINT,
        vec![EdgeNodeInfo::new(2, "Temp")],
        SubRequest::new(SubType::Republish),
    );
    harness.manager.send_request(&republish).unwrap();
    let (kind, _) = harness.next_message().await;
    assert_eq!(kind, CallbackKind::Response);
}

#[tokio::test]
async fn disconnect_tears_down_the_publish_task() {
    let mut harness = setup();
    harness.connect(ENDPOINT).await;

    harness.manager.send_request(&create_request(&["Temp"])).unwrap();
    harness.next_message().await;

    harness
        .manager
        .send_request(&EdgeMessage::stop_client(ENDPOINT))
        .unwrap();
    harness.next_status().await;

    tokio::time::sleep(Duration::from_millis(150)).await;
    let settled = harness.session.publish_count.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(harness.session.publish_count.load(Ordering::SeqCst), settled);
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The subscription executor: Create, Modify, Delete and Republish,
//! dispatched by the sub-command on the first request element, plus the
//! notification path that turns delivered data values into Report
//! messages.

use std::sync::Arc;

use log::{debug, error, info, warn};
use opcua_edge_types::{
    DataValue, EdgeCommand, EdgeMessage, EdgeNodeId, EdgeNodeInfo, EdgeResponse, EdgeStatusCode,
    EdgeVariant, MessageType, MonitoredItemCreate, MonitoredItemModify, MonitoringMode,
    ReadValueId, StatusCode, SubRequest, SubType, SubscriptionParams, ATTRIBUTE_ID_VALUE,
};

use crate::constants::REPUBLISH_RETRANSMIT_SEQUENCE;
use crate::dispatcher::AdapterInner;
use crate::session::SessionHandle;
use crate::stack::NotificationSink;
use crate::subscription::SubscriptionInfo;

pub(crate) async fn execute_subscription(
    inner: &Arc<AdapterInner>,
    handle: &Arc<SessionHandle>,
    msg: &EdgeMessage,
) {
    let Some(sub_request) = msg
        .request_slice()
        .first()
        .and_then(|r| r.sub_request.clone())
    else {
        inner.send_error_response(
            msg,
            EdgeStatusCode::ParamInvalid,
            "Subscription request is missing",
        );
        return;
    };

    let outcome = match sub_request.sub_type {
        SubType::Create => create(inner, handle, msg, &sub_request).await,
        SubType::Modify => modify(handle, msg, &sub_request).await,
        SubType::Delete => delete(handle, msg).await,
        SubType::Republish => republish(handle, msg).await,
    };

    match outcome {
        Ok(()) => {
            let mut result_msg = EdgeMessage::new(
                msg.endpoint_info.clone(),
                msg.command,
                MessageType::GeneralResponse,
            );
            result_msg.message_id = msg.message_id;
            result_msg.result = Some(EdgeStatusCode::Ok);
            result_msg.responses = msg
                .request_slice()
                .iter()
                .map(|request| EdgeResponse {
                    node_info: request.node_info.clone(),
                    request_id: request.request_id,
                    value: Some(EdgeVariant::String(StatusCode::Good.name().to_string())),
                    diagnostic_info: None,
                })
                .collect();
            inner.push_recv(result_msg);
        }
        Err(status) => {
            error!("subscription operation failed: {status}");
            inner.send_error_response(
                msg,
                EdgeStatusCode::Service(status),
                "Error in subscription operation",
            );
        }
    }
}

async fn create(
    inner: &Arc<AdapterInner>,
    handle: &Arc<SessionHandle>,
    msg: &EdgeMessage,
    sub_request: &SubRequest,
) -> Result<(), StatusCode> {
    // Creation is batched only, and a batch must not name an alias twice.
    if msg.message_type != MessageType::SendRequests {
        error!("subscription creation requires a batched request");
        return Err(StatusCode::BadRequestCancelledByClient);
    }
    let requests = msg.request_slice();
    for (i, a) in requests.iter().enumerate() {
        for b in requests.iter().take(i) {
            if a.node_info.value_alias == b.node_info.value_alias {
                error!(
                    "message contains duplicate subscription requests for {}",
                    a.node_info.value_alias
                );
                return Err(StatusCode::BadRequestCancelledByClient);
            }
        }
    }
    {
        let state = handle.subscriptions.lock();
        for request in requests {
            if state.items.contains_key(&request.node_info.value_alias) {
                error!("node {} is already subscribed", request.node_info.value_alias);
                return Err(StatusCode::BadRequestCancelledByClient);
            }
        }
    }

    let revised = handle
        .session
        .create_subscription(subscription_params(sub_request))
        .await?;
    let subscription_id = revised.subscription_id;
    if subscription_id == 0 {
        return Err(StatusCode::BadSubscriptionIdInvalid);
    }
    if handle.subscriptions.lock().has_subscription_id(subscription_id) {
        // The server handing out an id this session already tracks means
        // the bookkeeping has diverged.
        error!("subscription id {subscription_id} is already known to this session");
        return Err(StatusCode::BadSubscriptionIdInvalid);
    }
    debug!(
        "created subscription {subscription_id} with revised publishing interval {}",
        revised.revised_publishing_interval
    );

    let items = requests
        .iter()
        .enumerate()
        .map(|(index, request)| MonitoredItemCreate {
            item_to_monitor: ReadValueId {
                node_id: EdgeNodeId::string(
                    request.node_info.namespace(),
                    &request.node_info.value_alias,
                ),
                attribute_id: ATTRIBUTE_ID_VALUE,
            },
            sampling_interval: request
                .sub_request
                .as_ref()
                .map(|s| s.sampling_interval)
                .unwrap_or(sub_request.sampling_interval),
            queue_size: 1,
            discard_oldest: true,
            client_handle: index as u32 + 1,
        })
        .collect();
    let results = handle
        .session
        .add_monitored_items(subscription_id, items, notification_sink(inner, handle))
        .await?;

    let mut state = handle.subscriptions.lock();
    for (request, item) in requests.iter().zip(results.iter()) {
        if item.monitored_item_id == 0 {
            return Err(StatusCode::BadMonitoredItemIdInvalid);
        }
        if state.monitored_item_exists(subscription_id, item.monitored_item_id) {
            warn!(
                "monitored item {} already exists in subscription {subscription_id}, skipping",
                item.monitored_item_id
            );
            continue;
        }
        if item.status.is_bad() {
            return Err(item.status);
        }
        debug!(
            "monitoring {} as item {} of subscription {subscription_id}",
            request.node_info.value_alias, item.monitored_item_id
        );
        state.items.insert(
            request.node_info.value_alias.clone(),
            SubscriptionInfo {
                msg: msg.clone(),
                subscription_id,
                monitored_item_id: item.monitored_item_id,
            },
        );
    }

    if state.subscription_count == 0 {
        state.spawn_publish(handle.session.clone());
    }
    state.subscription_count += 1;
    Ok(())
}

async fn modify(
    handle: &Arc<SessionHandle>,
    msg: &EdgeMessage,
    sub_request: &SubRequest,
) -> Result<(), StatusCode> {
    let (subscription_id, monitored_item_id) = lookup(handle, msg)?;

    let revised = handle
        .session
        .modify_subscription(subscription_id, subscription_params(sub_request))
        .await?;
    if revised.revised_publishing_interval != sub_request.publishing_interval {
        warn!(
            "server revised the publishing interval from {} to {}",
            sub_request.publishing_interval, revised.revised_publishing_interval
        );
    }

    let results = handle
        .session
        .modify_monitored_items(
            subscription_id,
            vec![MonitoredItemModify {
                monitored_item_id,
                sampling_interval: sub_request.sampling_interval,
                queue_size: sub_request.queue_size,
                discard_oldest: true,
                client_handle: 1,
            }],
        )
        .await?;
    for result in &results {
        if result.status.is_bad() {
            error!("modify monitored item failed: {}", result.status);
            return Err(result.status);
        }
        if result.revised_sampling_interval != sub_request.sampling_interval {
            warn!(
                "server revised the sampling interval from {} to {}",
                sub_request.sampling_interval, result.revised_sampling_interval
            );
        }
        if result.revised_queue_size != sub_request.queue_size {
            warn!(
                "server revised the queue size from {} to {}",
                sub_request.queue_size, result.revised_queue_size
            );
        }
    }

    let modes = handle
        .session
        .set_monitoring_mode(
            subscription_id,
            vec![monitored_item_id],
            MonitoringMode::Reporting,
        )
        .await?;
    if let Some(code) = modes.iter().find(|c| c.is_bad()) {
        error!("set monitoring mode failed: {code}");
        return Err(*code);
    }

    let publishing = handle
        .session
        .set_publishing_mode(vec![subscription_id], sub_request.publishing_enabled)
        .await?;
    if let Some(code) = publishing.iter().find(|c| c.is_bad()) {
        error!("set publishing mode failed: {code}");
        return Err(*code);
    }
    Ok(())
}

async fn delete(handle: &Arc<SessionHandle>, msg: &EdgeMessage) -> Result<(), StatusCode> {
    let alias = first_alias(msg)?;
    let (subscription_id, monitored_item_id) = lookup(handle, msg)?;

    handle
        .session
        .delete_monitored_item(subscription_id, monitored_item_id)
        .await?;
    let orphaned = {
        let mut state = handle.subscriptions.lock();
        state.items.remove(&alias);
        !state.has_subscription_id(subscription_id)
    };

    if orphaned {
        handle.session.delete_subscription(subscription_id).await?;
        info!("subscription {subscription_id} removed");
        let publish = {
            let mut state = handle.subscriptions.lock();
            state.subscription_count = state.subscription_count.saturating_sub(1);
            if state.subscription_count == 0 {
                state.take_publish()
            } else {
                None
            }
        };
        if let Some(task) = publish {
            task.stop().await;
        }
    }
    Ok(())
}

async fn republish(handle: &Arc<SessionHandle>, msg: &EdgeMessage) -> Result<(), StatusCode> {
    let (subscription_id, _) = lookup(handle, msg)?;
    match handle
        .session
        .republish(subscription_id, REPUBLISH_RETRANSMIT_SEQUENCE)
        .await
    {
        Ok(result) => {
            if result.notification_count > 0 {
                info!(
                    "republish returned sequence number {}",
                    result.sequence_number
                );
            }
            Ok(())
        }
        Err(StatusCode::BadMessageNotAvailable) => {
            warn!("no notification message available for retransmission");
            Ok(())
        }
        Err(status) => Err(status),
    }
}

fn first_alias(msg: &EdgeMessage) -> Result<String, StatusCode> {
    msg.request_slice()
        .first()
        .map(|r| r.node_info.value_alias.clone())
        .ok_or(StatusCode::BadNoSubscription)
}

fn lookup(handle: &SessionHandle, msg: &EdgeMessage) -> Result<(u32, u32), StatusCode> {
    let alias = first_alias(msg)?;
    let state = handle.subscriptions.lock();
    let info = state.items.get(&alias).ok_or(StatusCode::BadNoSubscription)?;
    Ok((info.subscription_id, info.monitored_item_id))
}

fn subscription_params(sub_request: &SubRequest) -> SubscriptionParams {
    SubscriptionParams {
        requested_publishing_interval: sub_request.publishing_interval,
        requested_lifetime_count: sub_request.lifetime_count,
        requested_max_keep_alive_count: sub_request.max_keep_alive_count,
        max_notifications_per_publish: sub_request.max_notifications_per_publish,
        publishing_enabled: sub_request.publishing_enabled,
        priority: sub_request.priority,
    }
}

/// The sink installed with every monitored item batch. Resolves the item
/// back to its alias and turns the delivered value into a Report message
/// on the receive queue; anything that cannot be resolved is dropped
/// silently.
fn notification_sink(inner: &Arc<AdapterInner>, handle: &Arc<SessionHandle>) -> NotificationSink {
    let inner = Arc::downgrade(inner);
    let handle = Arc::downgrade(handle);
    Arc::new(move |monitored_item_id: u32, data_value: DataValue| {
        if data_value.status.is_bad() {
            debug!(
                "dropping notification with status {} for item {monitored_item_id}",
                data_value.status
            );
            return;
        }
        let Some(value) = data_value.value else {
            return;
        };
        let (Some(inner), Some(handle)) = (inner.upgrade(), handle.upgrade()) else {
            return;
        };
        let report = {
            let state = handle.subscriptions.lock();
            let Some((alias, info)) = state
                .items
                .iter()
                .find(|(_, info)| info.monitored_item_id == monitored_item_id)
            else {
                return;
            };
            let mut report = EdgeMessage::new(
                info.msg.endpoint_info.clone(),
                EdgeCommand::Sub,
                MessageType::Report,
            );
            report.message_id = info.msg.message_id;
            report.responses = vec![EdgeResponse {
                node_info: EdgeNodeInfo {
                    node_id: None,
                    value_alias: alias.clone(),
                    method_name: None,
                },
                request_id: 0,
                value: Some(value),
                diagnostic_info: None,
            }];
            report
        };
        inner.push_recv(report);
    })
}

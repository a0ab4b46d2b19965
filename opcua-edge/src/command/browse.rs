// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The Browse executor. One browse response message is emitted per
//! browsed node; continuation points on the inbound message resume an
//! earlier browse with BrowseNext instead.

use std::sync::Arc;

use log::error;
use opcua_edge_types::{
    BrowseDescription, BrowseDirection, BrowseResult, EdgeBrowseResult, EdgeMessage, EdgeNodeId,
    EdgeNodeInfo, EdgeRequest, EdgeResponse, EdgeStatusCode, MessageType,
};

use crate::dispatcher::AdapterInner;
use crate::session::SessionHandle;

pub(crate) async fn execute_browse(
    inner: Arc<AdapterInner>,
    handle: Arc<SessionHandle>,
    msg: EdgeMessage,
) {
    let direction = msg
        .browse_param
        .as_ref()
        .map(|p| p.direction)
        .unwrap_or(BrowseDirection::Forward);
    let max_references = msg
        .browse_param
        .as_ref()
        .map(|p| p.max_references_per_node)
        .unwrap_or(0);

    let requests = msg.request_slice();
    let results = if msg.continuation_points.is_empty() {
        let nodes_to_browse = requests
            .iter()
            .map(|r| BrowseDescription {
                node_id: browse_node_id(r),
                direction,
            })
            .collect();
        handle.session.browse(nodes_to_browse, max_references).await
    } else {
        handle
            .session
            .browse_next(msg.continuation_points.clone(), false)
            .await
    };

    let results = match results {
        Ok(results) => results,
        Err(status) => {
            error!("error in browse: {status}");
            inner.send_error_response(&msg, EdgeStatusCode::Service(status), "Error in browse");
            return;
        }
    };

    for (index, result) in results.iter().enumerate() {
        let node_info = requests
            .get(index)
            .map(|r| r.node_info.clone())
            .unwrap_or_default();
        let request_id = requests.get(index).map(|r| r.request_id).unwrap_or(0);
        if result.status.is_bad() {
            error!(
                "error in browse result for {}: {}",
                node_info.value_alias, result.status
            );
            inner.send_error_response(
                &msg,
                EdgeStatusCode::Service(result.status),
                "Error in browse result",
            );
            continue;
        }
        inner.push_recv(browse_response(&msg, node_info, request_id, result));
    }
}

/// Browse may target a node by full id; the wire alias is only a
/// fallback.
fn browse_node_id(request: &EdgeRequest) -> EdgeNodeId {
    match &request.node_info.node_id {
        Some(node_id) => node_id.clone(),
        None => EdgeNodeId::string(request.node_info.namespace(), &request.node_info.value_alias),
    }
}

fn browse_response(
    origin: &EdgeMessage,
    node_info: EdgeNodeInfo,
    request_id: u32,
    result: &BrowseResult,
) -> EdgeMessage {
    let mut response = EdgeMessage::new(
        origin.endpoint_info.clone(),
        origin.command,
        MessageType::BrowseResponse,
    );
    response.message_id = origin.message_id;
    response.result = Some(EdgeStatusCode::Ok);
    response.responses = vec![EdgeResponse {
        node_info,
        request_id,
        value: None,
        diagnostic_info: None,
    }];
    response.browse_results = result
        .references
        .iter()
        .map(|reference| EdgeBrowseResult {
            browse_name: reference.browse_name.clone(),
        })
        .collect();
    if !result.continuation_point.is_null_or_empty() {
        response
            .continuation_points
            .push(result.continuation_point.clone());
    }
    response
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The Write executor.

use std::sync::Arc;

use log::{debug, error};
use opcua_edge_types::{
    DataValue, EdgeMessage, EdgeNodeId, EdgeResponse, EdgeStatusCode, EdgeVariant, MessageType,
    WriteValue, ATTRIBUTE_ID_VALUE,
};

use crate::dispatcher::AdapterInner;
use crate::session::SessionHandle;

pub(crate) async fn execute_write(
    inner: Arc<AdapterInner>,
    handle: Arc<SessionHandle>,
    msg: EdgeMessage,
) {
    let requests = msg.request_slice();
    let nodes_to_write = requests
        .iter()
        .map(|r| WriteValue {
            node_id: EdgeNodeId::string(r.node_info.namespace(), &r.node_info.value_alias),
            attribute_id: ATTRIBUTE_ID_VALUE,
            // Validation guarantees a value on every write operand.
            value: DataValue::new(r.value.clone().unwrap_or_default()),
        })
        .collect();

    let results = match handle.session.write(nodes_to_write).await {
        Ok(results) => results,
        Err(status) => {
            error!("error in write: {status}");
            inner.send_error_response(&msg, EdgeStatusCode::Service(status), "Error in write");
            return;
        }
    };

    if results.len() != requests.len() {
        error!(
            "requested {} writes but received {} results",
            requests.len(),
            results.len()
        );
        inner.send_error_response(&msg, EdgeStatusCode::Error, "Error in write operation");
        return;
    }

    let mut responses = Vec::new();
    for (request, code) in requests.iter().zip(results.iter()) {
        if code.is_good() {
            responses.push(EdgeResponse {
                node_info: request.node_info.clone(),
                request_id: request.request_id,
                value: Some(EdgeVariant::String(code.name().to_string())),
                diagnostic_info: None,
            });
        } else {
            error!(
                "error in write response for {}: {}",
                request.node_info.value_alias, code
            );
            inner.send_error_response(
                &msg,
                EdgeStatusCode::Service(*code),
                "Error in write Response",
            );
        }
    }

    if responses.is_empty() {
        debug!("write batch produced no successful responses");
        return;
    }
    let mut result_msg = EdgeMessage::new(
        msg.endpoint_info.clone(),
        msg.command,
        MessageType::GeneralResponse,
    );
    result_msg.message_id = msg.message_id;
    result_msg.result = Some(EdgeStatusCode::Ok);
    result_msg.responses = responses;
    inner.push_recv(result_msg);
}

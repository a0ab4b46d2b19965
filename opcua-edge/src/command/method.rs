// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The Method executor. Methods hang off the Objects folder; the target
//! is identified by the request's namespace and wire alias.

use std::sync::Arc;

use log::{debug, error};
use opcua_edge_types::{
    EdgeMessage, EdgeNodeId, EdgeResponse, EdgeStatusCode, EdgeVariant, MessageType,
    OBJECTS_FOLDER_NODE_ID,
};

use crate::dispatcher::AdapterInner;
use crate::session::SessionHandle;

pub(crate) async fn execute_method(
    inner: Arc<AdapterInner>,
    handle: Arc<SessionHandle>,
    msg: EdgeMessage,
) {
    let Some(request) = msg.request_slice().first() else {
        inner.send_error_response(
            &msg,
            EdgeStatusCode::ParamInvalid,
            "Error in executing METHOD OPERATION.",
        );
        return;
    };
    let Some(params) = &request.method_params else {
        inner.send_error_response(
            &msg,
            EdgeStatusCode::ParamInvalid,
            "Error in executing METHOD OPERATION.",
        );
        return;
    };

    let input_args: Vec<EdgeVariant> = params.input_args.iter().map(|a| a.value.clone()).collect();
    debug!(
        "calling {} with {} input arguments",
        request.node_info.value_alias,
        input_args.len()
    );

    let object_id = EdgeNodeId::numeric(0, OBJECTS_FOLDER_NODE_ID);
    let method_id =
        EdgeNodeId::string(request.node_info.namespace(), &request.node_info.value_alias);
    let outputs = match handle.session.call(object_id, method_id, input_args).await {
        Ok(outputs) => outputs,
        Err(status) => {
            error!("method call failed: {status}");
            inner.send_error_response(
                &msg,
                EdgeStatusCode::Service(status),
                "Error in executing METHOD OPERATION.",
            );
            return;
        }
    };

    let mut result_msg = EdgeMessage::new(
        msg.endpoint_info.clone(),
        msg.command,
        MessageType::GeneralResponse,
    );
    result_msg.message_id = msg.message_id;
    result_msg.result = Some(EdgeStatusCode::Ok);
    result_msg.responses = outputs
        .into_iter()
        .map(|output| EdgeResponse {
            node_info: request.node_info.clone(),
            request_id: request.request_id,
            value: Some(output),
            diagnostic_info: None,
        })
        .collect();
    inner.push_recv(result_msg);
}

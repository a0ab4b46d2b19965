// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The Read executor.
//!
//! Reads are issued as one batch. The batch shares one request header, so
//! the timestamp policy, max-age and sanity checks gate the whole result;
//! individual operand failures are reported per element while the rest of
//! the batch is delivered.

use std::sync::Arc;

use log::{debug, error};
use opcua_edge_types::{
    DataValue, EdgeCommand, EdgeDiagnosticInfo, EdgeMessage, EdgeNodeId, EdgeResponse,
    EdgeStatusCode, MessageType, ReadParams, ReadValueId, TimestampsToReturn, UaDateTime,
    ATTRIBUTE_ID_MINIMUM_SAMPLING_INTERVAL, ATTRIBUTE_ID_VALUE,
};

use crate::constants::{READ_MAX_AGE_MS, TIMESTAMP_VALID_WINDOW_MS};
use crate::dispatcher::AdapterInner;
use crate::session::SessionHandle;

pub(crate) async fn execute_read(
    inner: Arc<AdapterInner>,
    handle: Arc<SessionHandle>,
    msg: EdgeMessage,
) {
    let requests = msg.request_slice();
    let attribute_id = if msg.command == EdgeCommand::ReadSamplingInterval {
        ATTRIBUTE_ID_MINIMUM_SAMPLING_INTERVAL
    } else {
        ATTRIBUTE_ID_VALUE
    };
    let nodes_to_read = requests
        .iter()
        .map(|r| ReadValueId {
            node_id: EdgeNodeId::string(r.node_info.namespace(), &r.node_info.value_alias),
            attribute_id,
        })
        .collect();
    let params = ReadParams {
        max_age: READ_MAX_AGE_MS,
        timestamps_to_return: TimestampsToReturn::Both,
        nodes_to_read,
        return_diagnostics: 0,
    };
    let stamp_mode = params.timestamps_to_return;
    let return_diagnostics = params.return_diagnostics;

    let read_result = match handle.session.read(params).await {
        Ok(result) => result,
        Err(status) => {
            error!("error in group read: {status}");
            inner.send_error_response(&msg, EdgeStatusCode::Service(status), "Error in read");
            return;
        }
    };

    // The request header is shared by the batch, so the policy checks run
    // against the first result.
    if let Some(first) = read_result.results.first() {
        if first.status.is_good() {
            if !timestamps_match_policy(first, stamp_mode) {
                inner.send_error_response(&msg, EdgeStatusCode::Error, "Missing Timestamp");
                return;
            }
            if stamp_mode != TimestampsToReturn::Neither {
                if !check_max_age(first.server_timestamp, UaDateTime::now(), READ_MAX_AGE_MS * 2.0)
                {
                    inner.send_error_response(&msg, EdgeStatusCode::Error, "Max age exceeded");
                    return;
                }
                if let Some(desc) = batch_validation_error(first, stamp_mode) {
                    inner.send_error_response(&msg, EdgeStatusCode::Error, desc);
                    return;
                }
            }
        }
    }

    let mut responses = Vec::new();
    for (request, result) in requests.iter().zip(read_result.results.iter()) {
        if result.status.is_good() {
            responses.push(EdgeResponse {
                node_info: request.node_info.clone(),
                request_id: request.request_id,
                value: result.value.clone(),
                diagnostic_info: check_diagnostic_info(
                    requests.len(),
                    &read_result.diagnostics,
                    return_diagnostics,
                ),
            });
        } else {
            error!(
                "error in read response for {}: {}",
                request.node_info.value_alias, result.status
            );
            inner.send_error_response(
                &msg,
                EdgeStatusCode::Service(result.status),
                "Error in read response",
            );
        }
    }

    if responses.is_empty() {
        debug!("read batch produced no successful responses");
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

/// The policy fixed into the request must be visible on the result: every
/// requested timestamp present, every unrequested one absent.
fn timestamps_match_policy(result: &DataValue, stamp: TimestampsToReturn) -> bool {
    let has_source = result.source_timestamp.is_some();
    let has_server = result.server_timestamp.is_some();
    match stamp {
        TimestampsToReturn::Both => has_source && has_server,
        TimestampsToReturn::Source => has_source && !has_server,
        TimestampsToReturn::Server => !has_source && has_server,
        TimestampsToReturn::Neither => !has_source && !has_server,
    }
}

/// The server timestamp may lag wall clock by at most `max_age`
/// milliseconds, and never lead it.
fn check_max_age(server_timestamp: Option<UaDateTime>, now: UaDateTime, max_age: f64) -> bool {
    let Some(timestamp) = server_timestamp else {
        return false;
    };
    if timestamp > now {
        return false;
    }
    let diff = now.as_unix_ms() - timestamp.as_unix_ms();
    max_age == 0.0 || diff <= max_age as i64
}

/// Sanity of the timestamps themselves plus status and array length of
/// the leading result. Returns the error description on failure.
fn batch_validation_error(result: &DataValue, stamp: TimestampsToReturn) -> Option<&'static str> {
    if !check_valid_time(result, stamp, TIMESTAMP_VALID_WINDOW_MS) {
        return Some("Invalid Time");
    }
    if result.status.is_bad() {
        return Some("Error status code from server");
    }
    if let Some(value) = &result.value {
        if value.is_array() && value.array_length() == 0 {
            return Some("Invalid array length in read response");
        }
    }
    None
}

fn check_valid_time(result: &DataValue, stamp: TimestampsToReturn, valid_window_ms: i64) -> bool {
    let now = UaDateTime::now().as_unix_ms();
    let server = result.server_timestamp.map(|t| t.as_unix_ms()).unwrap_or(0);
    let source = result.source_timestamp.map(|t| t.as_unix_ms()).unwrap_or(0);
    let in_window = |ts: i64| ts != 0 && now - ts <= valid_window_ms && ts <= now;
    match stamp {
        TimestampsToReturn::Both => in_window(server) && in_window(source),
        TimestampsToReturn::Source => in_window(source),
        TimestampsToReturn::Server => in_window(server),
        TimestampsToReturn::Neither => true,
    }
}

/// Diagnostics are carried through when they line up with the request,
/// otherwise the mismatch is recorded in place of them.
fn check_diagnostic_info(
    nodes_to_process: usize,
    diagnostics: &[EdgeDiagnosticInfo],
    return_diagnostics: u32,
) -> Option<EdgeDiagnosticInfo> {
    if return_diagnostics == 0 && diagnostics.is_empty() {
        None
    } else if diagnostics.len() == nodes_to_process {
        Some(diagnostics[0].clone())
    } else if return_diagnostics != 0 && diagnostics.is_empty() {
        Some(EdgeDiagnosticInfo::from_message(
            "no diagnostics were returned even though returnDiagnostic requested",
        ))
    } else {
        Some(EdgeDiagnosticInfo::from_message("mismatch entries returned"))
    }
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Structural validation of requests before they are cloned and enqueued.
//!
//! Validation is the only step allowed to rewrite a message: an endpoint
//! URI without an explicit port gets the default OPC UA port inserted.
//! Everything else is reject-only; nothing invalid reaches the queues.

use lazy_static::lazy_static;
use log::debug;
use opcua_edge_types::{
    EdgeCommand, EdgeError, EdgeMessage, EdgeVariant, MessageType, DEFAULT_OPC_UA_PORT,
};
use regex::Regex;
use url::Url;

lazy_static! {
    static ref ENDPOINT_URI_WITH_PORT: Regex =
        Regex::new(r"^opc\.tcp://[^:/]+:\d+(/.*)?$").unwrap();
}

/// True if the URI already spells out a port.
pub(crate) fn check_endpoint_uri(endpoint_uri: &str) -> bool {
    ENDPOINT_URI_WITH_PORT.is_match(endpoint_uri)
}

/// Returns the URI with the default port inserted when it carries none.
/// Applying this twice is a no-op.
pub(crate) fn normalize_endpoint_uri(endpoint_uri: &str) -> Result<String, EdgeError> {
    if check_endpoint_uri(endpoint_uri) {
        return Ok(endpoint_uri.to_string());
    }
    debug!("endpoint uri {endpoint_uri} has no port number");
    let mut url = Url::parse(endpoint_uri)
        .map_err(|_| EdgeError::ParamInvalid("endpoint uri does not parse"))?;
    url.set_port(Some(DEFAULT_OPC_UA_PORT))
        .map_err(|_| EdgeError::ParamInvalid("endpoint uri cannot carry a port"))?;
    Ok(url.into())
}

/// Rejects structurally invalid messages and normalizes the endpoint URI
/// in place. Mirrors the rules a request must satisfy before an executor
/// may assume its shape.
pub(crate) fn check_parameter_valid(msg: &mut EdgeMessage) -> Result<(), EdgeError> {
    if msg.endpoint_info.endpoint_uri.is_empty() {
        return Err(EdgeError::ParamInvalid("endpoint uri is empty"));
    }
    msg.endpoint_info.endpoint_uri = normalize_endpoint_uri(&msg.endpoint_info.endpoint_uri)?;

    if let Some(requests) = &msg.requests {
        if requests.is_empty() {
            return Err(EdgeError::ParamInvalid(
                "request batch is present but empty",
            ));
        }
    }

    let needs_alias =
        msg.command != EdgeCommand::Browse && msg.command != EdgeCommand::BrowseView;
    for request in msg.request_slice() {
        if needs_alias && request.node_info.value_alias.is_empty() {
            return Err(EdgeError::ParamInvalid("value alias is empty"));
        }
    }

    let operates_on_nodes = matches!(
        msg.command,
        EdgeCommand::Read
            | EdgeCommand::ReadSamplingInterval
            | EdgeCommand::Write
            | EdgeCommand::Browse
            | EdgeCommand::Method
            | EdgeCommand::Sub
    );
    if operates_on_nodes {
        let missing = match msg.message_type {
            MessageType::SendRequest => msg.request.is_none(),
            MessageType::SendRequests => msg.requests.is_none(),
            _ => false,
        };
        if missing {
            return Err(EdgeError::ParamInvalid("request payload is missing"));
        }
    }

    if msg.command == EdgeCommand::Browse && msg.browse_param.is_none() {
        return Err(EdgeError::ParamInvalid("browse parameter is missing"));
    }

    if msg.command == EdgeCommand::Sub {
        for request in msg.request_slice() {
            if request.sub_request.is_none() {
                return Err(EdgeError::ParamInvalid("subscription request is missing"));
            }
        }
    }

    if msg.command == EdgeCommand::Write {
        for request in msg.request_slice() {
            match &request.value {
                None => return Err(EdgeError::ParamInvalid("write value is missing")),
                Some(EdgeVariant::Array(array)) if array.values.is_empty() => {
                    return Err(EdgeError::ParamInvalid("write array value is empty"))
                }
                _ => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opcua_edge_types::{
        BrowseParam, BrowseDirection, EdgeArray, EdgeNodeInfo, EdgeTypeId, SubRequest, SubType,
    };

    #[test]
    fn uri_with_port_passes_unchanged() {
        assert!(check_endpoint_uri("opc.tcp://localhost:4840"));
        assert_eq!(
            normalize_endpoint_uri("opc.tcp://localhost:4840").unwrap(),
            "opc.tcp://localhost:4840"
        );
    }

    #[test]
    fn missing_port_gets_default_inserted() {
        assert!(!check_endpoint_uri("opc.tcp://localhost"));
        assert_eq!(
            normalize_endpoint_uri("opc.tcp://localhost").unwrap(),
            "opc.tcp://localhost:4840"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_endpoint_uri("opc.tcp://host/path").unwrap();
        let twice = normalize_endpoint_uri(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let mut msg =
            EdgeMessage::read_request("opc.tcp://localhost:4840", vec![]);
        assert!(matches!(
            check_parameter_valid(&mut msg),
            Err(EdgeError::ParamInvalid(_))
        ));
    }

    #[test]
    fn read_without_alias_is_rejected() {
        let node = EdgeNodeInfo {
            value_alias: String::new(),
            ..EdgeNodeInfo::new(2, "x")
        };
        let mut msg = EdgeMessage::read_request("opc.tcp://localhost:4840", vec![node]);
        assert!(check_parameter_valid(&mut msg).is_err());
    }

    #[test]
    fn browse_without_param_is_rejected() {
        let mut msg = EdgeMessage::browse_request(
            "opc.tcp://localhost:4840",
            vec![EdgeNodeInfo::new(0, "")],
            BrowseParam {
                direction: BrowseDirection::Forward,
                max_references_per_node: 10,
            },
        );
        msg.browse_param = None;
        assert!(check_parameter_valid(&mut msg).is_err());
    }

    #[test]
    fn sub_requests_must_all_carry_a_sub_request() {
        let mut msg = EdgeMessage::sub_request(
            "opc.tcp://localhost:4840",
            vec![EdgeNodeInfo::new(2, "Temp")],
            SubRequest::new(SubType::Create),
        );
        assert!(check_parameter_valid(&mut msg).is_ok());
        msg.requests.as_mut().unwrap()[0].sub_request = None;
        assert!(check_parameter_valid(&mut msg).is_err());
    }

    #[test]
    fn empty_write_array_is_rejected() {
        let empty = EdgeVariant::Array(Box::new(
            EdgeArray::new(EdgeTypeId::Int32, vec![]).unwrap(),
        ));
        let mut msg = EdgeMessage::write_request(
            "opc.tcp://localhost:4840",
            vec![(EdgeNodeInfo::new(2, "Counter"), empty)],
        );
        assert!(check_parameter_valid(&mut msg).is_err());
    }

    #[test]
    fn write_value_is_required() {
        let mut msg = EdgeMessage::write_request(
            "opc.tcp://localhost:4840",
            vec![(EdgeNodeInfo::new(2, "Counter"), EdgeVariant::from(1i32))],
        );
        assert!(check_parameter_valid(&mut msg).is_ok());
        msg.requests.as_mut().unwrap()[0].value = None;
        assert!(check_parameter_valid(&mut msg).is_err());
    }

    #[test]
    fn uri_is_normalized_in_place() {
        let mut msg = EdgeMessage::read_request(
            "opc.tcp://remote",
            vec![EdgeNodeInfo::new(2, "Counter")],
        );
        check_parameter_valid(&mut msg).unwrap();
        assert_eq!(msg.endpoint_info.endpoint_uri, "opc.tcp://remote:4840");
    }
}

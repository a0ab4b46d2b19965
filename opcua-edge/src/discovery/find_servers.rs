// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! FindServers: ask a discovery server for registered applications and
//! validate what comes back.

use std::sync::Arc;

use log::{debug, info};
use opcua_edge_types::{ApplicationConfig, EdgeError};

use crate::discovery::{convert_application, is_server_description_valid};
use crate::dispatcher::AdapterInner;
use crate::session;

pub(crate) async fn execute(
    inner: &Arc<AdapterInner>,
    endpoint_uri: &str,
    server_uris: &[String],
    locale_ids: &[String],
) -> Result<Vec<ApplicationConfig>, EdgeError> {
    if server_uris.iter().any(|u| u.is_empty()) {
        return Err(EdgeError::ParamInvalid("server uri filter entry is empty"));
    }
    if locale_ids.iter().any(|l| l.is_empty()) {
        return Err(EdgeError::ParamInvalid("locale id filter entry is empty"));
    }
    // Reject unparsable endpoints before touching the network.
    session::parse_endpoint(endpoint_uri)?;

    let servers = inner
        .connector
        .find_servers(endpoint_uri, server_uris, locale_ids)
        .await
        .map_err(EdgeError::ServiceResult)?;
    info!("discovery at {endpoint_uri} returned {} applications", servers.len());

    let supported = inner.supported_types();
    let mut registered = Vec::new();
    for server in &servers {
        if !is_server_description_valid(server, supported, server_uris, locale_ids) {
            debug!("excluding invalid server application information");
            continue;
        }
        let mut config = convert_application(server);
        // A discovery server that lists itself as its own gateway would
        // send a client in circles.
        if server.gateway_server_uri == endpoint_uri {
            debug!("gateway server uri equals the queried endpoint, clearing it");
            config.gateway_server_uri = None;
        }
        registered.push(config);
    }
    Ok(registered)
}

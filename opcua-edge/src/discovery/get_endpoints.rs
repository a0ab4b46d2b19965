// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! GetEndpoints: ask a server for its endpoints, filter them and deliver
//! the survivors as a device through the discovery callback.

use std::sync::Arc;

use log::{debug, info};
use opcua_edge_types::{Device, EdgeError, EndpointDescription, EndpointInfo};

use crate::discovery::{convert_application, is_endpoint_description_valid};
use crate::dispatcher::AdapterInner;
use crate::session;

pub(crate) async fn execute(inner: &Arc<AdapterInner>, endpoint_uri: &str) -> Result<(), EdgeError> {
    let (address, port, server_name) = session::parse_endpoint(endpoint_uri)?;
    let endpoints = inner
        .connector
        .get_endpoints(endpoint_uri)
        .await
        .map_err(EdgeError::ServiceResult)?;
    info!("server at {address}:{port} returned {} endpoints", endpoints.len());

    let supported = inner.supported_types();
    let survivors: Vec<EndpointInfo> = endpoints
        .iter()
        .filter(|ep| is_endpoint_description_valid(ep, supported))
        .map(convert_endpoint)
        .collect();
    if survivors.is_empty() {
        debug!("no endpoint of {address}:{port} passed validation");
        return Ok(());
    }

    let device = Device {
        address,
        port,
        server_name,
        endpoints: survivors,
    };
    if let Some(config) = inner.config() {
        config.discovery.on_endpoint_found(&device);
    }
    Ok(())
}

fn convert_endpoint(endpoint: &EndpointDescription) -> EndpointInfo {
    EndpointInfo {
        endpoint_uri: endpoint.endpoint_url.clone(),
        security_mode: endpoint.security_mode,
        security_policy_uri: endpoint.security_policy_uri.clone(),
        transport_profile_uri: endpoint.transport_profile_uri.clone(),
        security_level: endpoint.security_level,
        endpoint_config: None,
        app_config: Some(convert_application(&endpoint.server)),
    }
}

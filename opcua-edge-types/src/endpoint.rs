// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Endpoint and application identity records exchanged with the caller.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::LocalizedText;

/// Message security mode of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SecurityMode {
    /// The mode could not be determined; such endpoints are filtered out.
    Invalid,
    /// No security is applied.
    #[default]
    None,
    /// Messages are signed but not encrypted.
    Sign,
    /// Messages are signed and encrypted.
    SignAndEncrypt,
}

/// The role an OPC UA application plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApplicationType {
    /// The application is a server.
    #[default]
    Server,
    /// The application is a client.
    Client,
    /// The application is both a client and a server.
    ClientAndServer,
    /// The application is a discovery server.
    DiscoveryServer,
}

bitflags! {
    /// Bitmask of the application types a client accepts during discovery.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ApplicationTypeMask: u8 {
        /// Accept servers.
        const SERVER = 0x01;
        /// Accept clients.
        const CLIENT = 0x02;
        /// Accept combined client/server applications.
        const CLIENT_AND_SERVER = 0x04;
        /// Accept discovery servers.
        const DISCOVERY_SERVER = 0x08;
    }
}

impl ApplicationType {
    /// The mask bit corresponding to this application type.
    pub fn mask_bit(self) -> ApplicationTypeMask {
        match self {
            ApplicationType::Server => ApplicationTypeMask::SERVER,
            ApplicationType::Client => ApplicationTypeMask::CLIENT,
            ApplicationType::ClientAndServer => ApplicationTypeMask::CLIENT_AND_SERVER,
            ApplicationType::DiscoveryServer => ApplicationTypeMask::DISCOVERY_SERVER,
        }
    }
}

/// Transport level settings of an endpoint hosted or addressed by this
/// application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Service call timeout in milliseconds.
    pub request_timeout: u32,
    /// Name the server advertises.
    pub server_name: String,
    /// Address a hosted server binds to.
    pub bind_address: String,
    /// Port a hosted server binds to.
    pub bind_port: u16,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            request_timeout: 60_000,
            server_name: String::new(),
            bind_address: String::new(),
            bind_port: crate::DEFAULT_OPC_UA_PORT,
        }
    }
}

/// Identity of an OPC UA application, as validated and returned by
/// discovery.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Globally unique identifier of the application. Never empty.
    pub application_uri: String,
    /// Globally unique identifier of the product.
    pub product_uri: String,
    /// Human readable name of the application.
    pub application_name: LocalizedText,
    /// The role the application plays.
    pub application_type: ApplicationType,
    /// URI of the gateway server, empty unless the application is reached
    /// through a gateway. Forced empty by discovery when it would point back
    /// at the queried server.
    pub gateway_server_uri: Option<String>,
    /// URI of the discovery profile the application supports.
    pub discovery_profile_uri: Option<String>,
    /// URLs the application can be discovered on.
    pub discovery_urls: Vec<String>,
}

/// An addressable OPC UA endpoint, immutable once attached to a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EndpointInfo {
    /// The `opc.tcp://host[:port][/path]` URI of the endpoint. Validation
    /// inserts the default port when absent.
    pub endpoint_uri: String,
    /// Security mode of the endpoint.
    pub security_mode: SecurityMode,
    /// URI of the security policy.
    pub security_policy_uri: String,
    /// URI of the transport profile.
    pub transport_profile_uri: String,
    /// Relative security level assigned by the server.
    pub security_level: u8,
    /// Transport settings, when known.
    pub endpoint_config: Option<EndpointConfig>,
    /// Identity of the application hosting the endpoint, when known.
    pub app_config: Option<ApplicationConfig>,
}

impl EndpointInfo {
    /// An endpoint info carrying only a URI.
    pub fn new(endpoint_uri: &str) -> EndpointInfo {
        EndpointInfo {
            endpoint_uri: endpoint_uri.to_string(),
            ..Default::default()
        }
    }
}

/// A device discovered through GetEndpoints: the address of a server and
/// the endpoints it offers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Device {
    /// Host name or address of the server.
    pub address: String,
    /// Port of the server.
    pub port: u16,
    /// Name of the server, when the URL carries one.
    pub server_name: Option<String>,
    /// The endpoints that survived validation.
    pub endpoints: Vec<EndpointInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_type_owns_the_client_mask_bit() {
        assert_eq!(
            ApplicationType::Client.mask_bit(),
            ApplicationTypeMask::CLIENT
        );
        assert!(ApplicationTypeMask::all().contains(ApplicationTypeMask::DISCOVERY_SERVER));
    }

    #[test]
    fn endpoint_info_serde_round_trip() {
        let info = EndpointInfo {
            endpoint_uri: "opc.tcp://host:4840".to_string(),
            security_mode: SecurityMode::Sign,
            security_policy_uri: "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256"
                .to_string(),
            transport_profile_uri: String::new(),
            security_level: 2,
            endpoint_config: Some(EndpointConfig::default()),
            app_config: Some(ApplicationConfig {
                application_uri: "urn:test".to_string(),
                application_type: ApplicationType::Server,
                ..Default::default()
            }),
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: EndpointInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}

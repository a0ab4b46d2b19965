// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Discovery: GetEndpoints and FindServers with the validation rules the
//! adapter applies to everything a (possibly foreign) server returns.

pub(crate) mod find_servers;
pub(crate) mod get_endpoints;

use log::debug;
use opcua_edge_types::{
    ApplicationConfig, ApplicationDescription, ApplicationType, ApplicationTypeMask,
    EndpointDescription, SecurityMode, UserTokenType,
};

const SECURITY_POLICY_URI_PREFIX: &str = "http://opcfoundation.org/UA/SecurityPolicy#";
const TRANSPORT_PROFILE_URI_PREFIX: &str = "http://opcfoundation.org/UA-Profile/Transport/";

/// True if the application type is accepted by the configured mask.
pub(crate) fn is_application_type_supported(
    application_type: ApplicationType,
    supported: ApplicationTypeMask,
) -> bool {
    supported.contains(application_type.mask_bit())
}

/// Filter chain applied to every endpoint returned by GetEndpoints. An
/// endpoint failing any rule is skipped, not an error.
pub(crate) fn is_endpoint_description_valid(
    endpoint: &EndpointDescription,
    supported: ApplicationTypeMask,
) -> bool {
    if !is_application_type_supported(endpoint.server.application_type, supported) {
        debug!("endpoint has an unsupported application type, excluding it");
        return false;
    }
    if endpoint.endpoint_url.is_empty() {
        debug!("endpoint url is empty, endpoint is invalid");
        return false;
    }
    if endpoint.security_mode == SecurityMode::Invalid {
        debug!("invalid message security mode, endpoint is invalid");
        return false;
    }
    if endpoint.security_policy_uri.is_empty()
        || !endpoint
            .security_policy_uri
            .starts_with(SECURITY_POLICY_URI_PREFIX)
    {
        debug!("malformed security policy uri, endpoint is invalid");
        return false;
    }
    if endpoint.transport_profile_uri.is_empty()
        || !endpoint
            .transport_profile_uri
            .starts_with(TRANSPORT_PROFILE_URI_PREFIX)
    {
        debug!("malformed transport profile uri, endpoint is invalid");
        return false;
    }
    if endpoint.server.application_uri.is_empty() {
        debug!("application uri is empty, endpoint is invalid");
        return false;
    }
    if endpoint.server.application_type == ApplicationType::Client {
        if !endpoint.server.gateway_server_uri.is_empty() {
            debug!("application type is client but gateway server uri is not empty");
            return false;
        }
        if !endpoint.server.discovery_profile_uri.is_empty() {
            debug!("application type is client but discovery profile uri is not empty");
            return false;
        }
        if !endpoint.server.discovery_urls.is_empty() {
            debug!("application type is client but discovery urls are not empty");
            return false;
        }
    }
    for policy in &endpoint.user_identity_tokens {
        if policy.token_type == UserTokenType::IssuedToken && policy.issued_token_type.is_empty() {
            debug!("token type is IssuedToken but the issued token type is empty");
            return false;
        }
        if policy.token_type != UserTokenType::IssuedToken && !policy.issued_token_type.is_empty() {
            debug!("token type is not IssuedToken but an issued token type exists");
        }
    }
    if endpoint.server.is_zero_valued() {
        debug!("application description is empty, endpoint is invalid");
        return false;
    }
    if endpoint.security_level == 0 {
        debug!("security level is 0, connection to this endpoint will be insecure");
    }
    if endpoint.security_mode == SecurityMode::None {
        debug!("security mode is None, connection to this endpoint will be insecure");
    }
    true
}

/// IPv4 well-formedness: four dot separated decimal segments, each one to
/// three digits and at most 255.
pub(crate) fn is_ipv4_address_valid(address: &str) -> bool {
    let len = address.len();
    if !(7..=15).contains(&len) {
        return false;
    }
    let mut value: u32 = 0;
    let mut digits_in_segment = 0;
    let mut dots = 0;
    for b in address.bytes() {
        if b == b'.' {
            if !(1..=3).contains(&digits_in_segment) || value > 255 {
                return false;
            }
            value = 0;
            digits_in_segment = 0;
            dots += 1;
        } else if !b.is_ascii_digit() {
            return false;
        } else {
            value = value * 10 + u32::from(b - b'0');
            digits_in_segment += 1;
        }
    }
    dots == 3 && (1..=3).contains(&digits_in_segment) && value <= 255
}

/// Validation applied to every application returned by FindServers.
pub(crate) fn is_server_description_valid(
    server: &ApplicationDescription,
    supported: ApplicationTypeMask,
    server_uris: &[String],
    locale_ids: &[String],
) -> bool {
    if !is_application_type_supported(server.application_type, supported) {
        debug!("application type is not supported");
        return false;
    }
    if server.application_uri.len() < 5 {
        debug!("application uri is too short to be valid");
        return false;
    }
    // Application uris that are not a `urn:` are assumed to be endpoint
    // urls and must re-parse as one.
    if !server.application_uri.starts_with("urn:") {
        let Ok((host, _, _)) = crate::session::parse_endpoint(&server.application_uri) else {
            debug!("application uri is not a parsable endpoint url");
            return false;
        };
        if host.is_empty() {
            debug!("hostname in application uri is empty");
            return false;
        }
        let first = host.as_bytes()[0];
        if first != b'[' && (first == b'1' || first == b'2') && !is_ipv4_address_valid(&host) {
            debug!("ipv4 address in application uri is invalid");
            return false;
        }
    }
    if !server_uris.is_empty() && !server_uris.iter().any(|u| u == &server.application_uri) {
        debug!("application uri does not match the requested server uris");
        return false;
    }
    if !locale_ids.is_empty() {
        if server.application_name.locale.is_empty() {
            debug!("application name locale is empty");
            return false;
        }
        if !locale_ids
            .iter()
            .any(|l| l == &server.application_name.locale)
        {
            debug!("application name locale does not match the requested locales");
            return false;
        }
    }
    true
}

/// Converts a stack application description into the caller-facing record.
pub(crate) fn convert_application(server: &ApplicationDescription) -> ApplicationConfig {
    let optional = |s: &String| {
        if s.is_empty() {
            None
        } else {
            Some(s.clone())
        }
    };
    ApplicationConfig {
        application_uri: server.application_uri.clone(),
        product_uri: server.product_uri.clone(),
        application_name: server.application_name.clone(),
        application_type: server.application_type,
        gateway_server_uri: optional(&server.gateway_server_uri),
        discovery_profile_uri: optional(&server.discovery_profile_uri),
        discovery_urls: server.discovery_urls.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opcua_edge_types::LocalizedText;

    fn valid_endpoint() -> EndpointDescription {
        EndpointDescription {
            endpoint_url: "opc.tcp://host:4840".to_string(),
            server: ApplicationDescription {
                application_uri: "urn:test:server".to_string(),
                product_uri: "urn:test:product".to_string(),
                application_name: LocalizedText::new("en", "Test"),
                application_type: ApplicationType::Server,
                ..Default::default()
            },
            security_mode: SecurityMode::None,
            security_policy_uri: format!("{SECURITY_POLICY_URI_PREFIX}None"),
            user_identity_tokens: vec![],
            transport_profile_uri: format!("{TRANSPORT_PROFILE_URI_PREFIX}uatcp-uasc-uabinary"),
            security_level: 1,
        }
    }

    #[test]
    fn valid_endpoint_passes() {
        assert!(is_endpoint_description_valid(
            &valid_endpoint(),
            ApplicationTypeMask::SERVER
        ));
    }

    #[test]
    fn unsupported_application_type_is_filtered() {
        assert!(!is_endpoint_description_valid(
            &valid_endpoint(),
            ApplicationTypeMask::DISCOVERY_SERVER
        ));
    }

    #[test]
    fn bad_security_policy_prefix_is_filtered() {
        let mut ep = valid_endpoint();
        ep.security_policy_uri = "http://example.org/policy".to_string();
        assert!(!is_endpoint_description_valid(
            &ep,
            ApplicationTypeMask::SERVER
        ));
    }

    #[test]
    fn client_with_discovery_urls_is_filtered() {
        let mut ep = valid_endpoint();
        ep.server.application_type = ApplicationType::Client;
        ep.server.discovery_urls = vec!["opc.tcp://elsewhere:4840".to_string()];
        assert!(!is_endpoint_description_valid(
            &ep,
            ApplicationTypeMask::CLIENT
        ));
    }

    #[test]
    fn issued_token_without_type_is_filtered() {
        let mut ep = valid_endpoint();
        ep.user_identity_tokens = vec![opcua_edge_types::UserTokenPolicy {
            token_type: UserTokenType::IssuedToken,
            ..Default::default()
        }];
        assert!(!is_endpoint_description_valid(
            &ep,
            ApplicationTypeMask::SERVER
        ));
    }

    #[test]
    fn ipv4_boundaries() {
        assert!(is_ipv4_address_valid("0.0.0.0"));
        assert!(is_ipv4_address_valid("255.255.255.255"));
        assert!(is_ipv4_address_valid("10.0.0.1"));
        assert!(!is_ipv4_address_valid("256.0.0.1"));
        assert!(!is_ipv4_address_valid("1.2.3"));
        assert!(!is_ipv4_address_valid("1.2.3.4.5"));
        assert!(!is_ipv4_address_valid("1.2.3.a"));
        assert!(!is_ipv4_address_valid("1..2.3"));
    }

    #[test]
    fn client_and_server_type_requires_its_own_mask_bit() {
        let server = ApplicationDescription {
            application_uri: "urn:test:both".to_string(),
            application_type: ApplicationType::ClientAndServer,
            ..Default::default()
        };
        assert!(!is_server_description_valid(
            &server,
            ApplicationTypeMask::SERVER | ApplicationTypeMask::CLIENT,
            &[],
            &[]
        ));
        assert!(is_server_description_valid(
            &server,
            ApplicationTypeMask::CLIENT_AND_SERVER,
            &[],
            &[]
        ));
    }

    #[test]
    fn server_uri_filter_is_exact() {
        let server = ApplicationDescription {
            application_uri: "urn:A".to_string(),
            application_type: ApplicationType::Server,
            ..Default::default()
        };
        let uris = vec!["urn:A".to_string()];
        assert!(is_server_description_valid(
            &server,
            ApplicationTypeMask::SERVER,
            &uris,
            &[]
        ));
        let other = vec!["urn:AB".to_string()];
        assert!(!is_server_description_valid(
            &server,
            ApplicationTypeMask::SERVER,
            &other,
            &[]
        ));
    }

    #[test]
    fn locale_filter_requires_a_locale() {
        let mut server = ApplicationDescription {
            application_uri: "urn:test:server".to_string(),
            application_type: ApplicationType::Server,
            ..Default::default()
        };
        let locales = vec!["en".to_string()];
        assert!(!is_server_description_valid(
            &server,
            ApplicationTypeMask::SERVER,
            &[],
            &locales
        ));
        server.application_name = LocalizedText::new("en", "Named");
        assert!(is_server_description_valid(
            &server,
            ApplicationTypeMask::SERVER,
            &[],
            &locales
        ));
    }

    #[test]
    fn non_urn_application_uri_must_parse_as_endpoint() {
        let mut server = ApplicationDescription {
            application_uri: "opc.tcp://10.0.0.1:4840".to_string(),
            application_type: ApplicationType::Server,
            ..Default::default()
        };
        assert!(is_server_description_valid(
            &server,
            ApplicationTypeMask::SERVER,
            &[],
            &[]
        ));
        server.application_uri = "opc.tcp://256.1.2.3:4840".to_string();
        assert!(!is_server_description_valid(
            &server,
            ApplicationTypeMask::SERVER,
            &[],
            &[]
        ));
    }
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The client session registry.
//!
//! Sessions are keyed by the canonical `host:port` form of their endpoint
//! URI, so two URIs addressing the same server (with or without a path,
//! with or without the default port spelled out) resolve to the same
//! entry. Connecting an endpoint whose key is already present is rejected
//! without side effect.

use std::sync::Arc;

use hashbrown::HashMap;
use log::{error, info};
use opcua_edge_types::{EdgeError, StatusCode, DEFAULT_OPC_UA_PORT};
use parking_lot::Mutex;
use url::Url;

use crate::stack::{UaConnector, UaSession};
use crate::subscription::SubscriptionState;

/// Scheme for OPC-UA TCP.
pub const OPC_TCP_SCHEME: &str = "opc.tcp";

/// Creates a `Url` from the input string, supplying the default port if
/// necessary.
fn opc_url_from_str(s: &str) -> Result<Url, EdgeError> {
    let mut url =
        Url::parse(s).map_err(|_| EdgeError::ParamInvalid("endpoint uri does not parse"))?;
    if url.scheme() != OPC_TCP_SCHEME {
        return Err(EdgeError::ParamInvalid("endpoint uri is not an opc.tcp uri"));
    }
    if url.port().is_none() {
        let _ = url.set_port(Some(DEFAULT_OPC_UA_PORT));
    }
    Ok(url)
}

/// The canonical registry key of an endpoint URI: `host:port`.
pub(crate) fn endpoint_key(endpoint_uri: &str) -> Result<String, EdgeError> {
    let url = opc_url_from_str(endpoint_uri)?;
    let host = url
        .host_str()
        .ok_or(EdgeError::ParamInvalid("endpoint uri has no host"))?;
    let port = url.port().unwrap_or(DEFAULT_OPC_UA_PORT);
    Ok(format!("{host}:{port}"))
}

/// Splits an endpoint URI into host, port and the server name carried in
/// its path, if any.
pub(crate) fn parse_endpoint(endpoint_uri: &str) -> Result<(String, u16, Option<String>), EdgeError> {
    let url = opc_url_from_str(endpoint_uri)?;
    let host = url
        .host_str()
        .ok_or(EdgeError::ParamInvalid("endpoint uri has no host"))?
        .to_string();
    let port = url.port().unwrap_or(DEFAULT_OPC_UA_PORT);
    let server_name = match url.path().trim_matches('/') {
        "" => None,
        name => Some(name.to_string()),
    };
    Ok((host, port, server_name))
}

/// A live client connection to one endpoint, shared between the send
/// queue worker and the session's publish task.
pub(crate) struct SessionHandle {
    /// Canonical `host:port` the handle is registered under.
    pub endpoint_key: String,
    /// The URI the session was connected with.
    pub endpoint_uri: String,
    /// The activated stack session.
    pub session: Arc<dyn UaSession>,
    /// Monitored item bookkeeping of this session.
    pub subscriptions: Mutex<SubscriptionState>,
}

/// Why a connect attempt did not produce a session.
#[derive(Debug)]
pub(crate) enum ConnectError {
    /// A session for the same `host:port` already exists.
    AlreadyConnected,
    /// The endpoint URI could not be parsed.
    InvalidUri,
    /// The stack refused the connection.
    Service(StatusCode),
}

/// Process-wide map of endpoint key to live session.
pub(crate) struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> SessionRegistry {
        SessionRegistry {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The session addressed by the URI, if one is connected.
    pub fn get(&self, endpoint_uri: &str) -> Option<Arc<SessionHandle>> {
        let key = endpoint_key(endpoint_uri).ok()?;
        self.sessions.lock().get(&key).cloned()
    }

    /// Connects a new session. Rejected when the canonical key is already
    /// present, leaving the existing entry untouched.
    pub async fn connect(
        &self,
        connector: &dyn UaConnector,
        endpoint_uri: &str,
    ) -> Result<Arc<SessionHandle>, ConnectError> {
        let key = endpoint_key(endpoint_uri).map_err(|_| ConnectError::InvalidUri)?;
        if self.sessions.lock().contains_key(&key) {
            return Err(ConnectError::AlreadyConnected);
        }
        let session = connector
            .connect(endpoint_uri)
            .await
            .map_err(ConnectError::Service)?;
        info!("client connected to {key}");
        let handle = Arc::new(SessionHandle {
            endpoint_key: key.clone(),
            endpoint_uri: endpoint_uri.to_string(),
            session,
            subscriptions: Mutex::new(SubscriptionState::default()),
        });
        self.sessions.lock().insert(key, handle.clone());
        Ok(handle)
    }

    /// Removes and returns the session addressed by the URI.
    pub fn remove(&self, endpoint_uri: &str) -> Option<Arc<SessionHandle>> {
        let key = match endpoint_key(endpoint_uri) {
            Ok(key) => key,
            Err(_) => {
                error!("cannot derive endpoint key from {endpoint_uri}");
                return None;
            }
        };
        let removed = self.sessions.lock().remove(&key);
        if removed.is_some() {
            info!("client disconnected from {key}");
        }
        removed
    }

    /// Number of live sessions.
    #[allow(unused)]
    pub fn count(&self) -> usize {
        self.sessions.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_key_strips_path_and_defaults_port() {
        assert_eq!(
            endpoint_key("opc.tcp://host:4840/path").unwrap(),
            "host:4840"
        );
        assert_eq!(endpoint_key("opc.tcp://host").unwrap(), "host:4840");
        assert_eq!(
            endpoint_key("opc.tcp://10.0.0.1:12686").unwrap(),
            "10.0.0.1:12686"
        );
    }

    #[test]
    fn uris_with_and_without_path_share_a_key() {
        assert_eq!(
            endpoint_key("opc.tcp://host:4840").unwrap(),
            endpoint_key("opc.tcp://host:4840/path").unwrap()
        );
    }

    #[test]
    fn parse_endpoint_extracts_server_name() {
        let (host, port, name) = parse_endpoint("opc.tcp://host:4841/server").unwrap();
        assert_eq!(host, "host");
        assert_eq!(port, 4841);
        assert_eq!(name.as_deref(), Some("server"));

        let (_, port, name) = parse_endpoint("opc.tcp://host").unwrap();
        assert_eq!(port, 4840);
        assert!(name.is_none());
    }

    #[test]
    fn garbage_uri_is_rejected() {
        assert!(endpoint_key("not a uri").is_err());
    }
}

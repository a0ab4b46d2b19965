// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The caller-facing surface of the adapter.

use std::sync::Arc;

use opcua_edge_types::{
    ApplicationConfig, ApplicationTypeMask, EdgeError, EdgeMessage, EdgeVariant, EndpointInfo,
    StatusEvent,
};

use crate::callbacks::{DiscoveryCallback, ResponseCallback, StatusCallback};
use crate::discovery;
use crate::dispatcher::{AdapterConfig, AdapterInner};
use crate::server::{EdgeReference, NodeItem, ServerBackend, ServerLifecycle};
use crate::stack::UaConnector;
use crate::validation;

/// Everything an application registers before using the adapter.
pub struct EdgeConfigure {
    /// Receives responses, browse results, reports and errors.
    pub recv_callback: Arc<dyn ResponseCallback>,
    /// Receives lifecycle events.
    pub status_callback: Arc<dyn StatusCallback>,
    /// Receives devices found by GetEndpoints.
    pub discovery_callback: Arc<dyn DiscoveryCallback>,
    /// Application types accepted during discovery.
    pub supported_application_types: ApplicationTypeMask,
}

/// The adapter façade.
///
/// `send_request` runs entirely on the caller's task: it validates,
/// deep-copies and enqueues. Everything else happens on the queue workers
/// and is reported through the registered callbacks.
///
/// The manager must live inside a tokio runtime; the queue workers and the
/// publish tasks are spawned on it.
pub struct EdgeManager {
    inner: Arc<AdapterInner>,
}

impl EdgeManager {
    /// An adapter driving clients only.
    pub fn new(connector: Arc<dyn UaConnector>) -> EdgeManager {
        EdgeManager {
            inner: Arc::new(AdapterInner::new(connector, ServerLifecycle::new(None))),
        }
    }

    /// An adapter that can additionally host a server through the given
    /// backend.
    pub fn with_server_backend(
        connector: Arc<dyn UaConnector>,
        backend: Arc<dyn ServerBackend>,
    ) -> EdgeManager {
        EdgeManager {
            inner: Arc::new(AdapterInner::new(
                connector,
                ServerLifecycle::new(Some(backend)),
            )),
        }
    }

    /// Registers the application callbacks and the supported application
    /// type mask. May be called again to replace them.
    pub fn configure(&self, config: EdgeConfigure) {
        self.inner.config.store(Some(Arc::new(AdapterConfig {
            response: config.recv_callback,
            status: config.status_callback,
            discovery: config.discovery_callback,
            supported_types: config.supported_application_types,
        })));
    }

    /// Validates the message, clones it and puts the clone on the send
    /// queue. The queue subsystem starts on first use. Nothing is enqueued
    /// on a validation failure and no callback will fire for the message.
    pub fn send_request(&self, msg: &EdgeMessage) -> Result<(), EdgeError> {
        self.inner.init_queues();
        let mut cloned = msg.clone();
        validation::check_parameter_valid(&mut cloned)?;
        self.inner.push_send(cloned)
    }

    /// Runs GetEndpoints for the message's endpoint. Surviving endpoints
    /// are delivered through the discovery callback.
    pub async fn get_endpoint_info(&self, msg: &EdgeMessage) -> Result<(), EdgeError> {
        if msg.endpoint_info.endpoint_uri.is_empty() {
            return Err(EdgeError::ParamInvalid("endpoint uri is empty"));
        }
        discovery::get_endpoints::execute(&self.inner, &msg.endpoint_info.endpoint_uri).await
    }

    /// Runs FindServers against a discovery server, returning the
    /// validated applications.
    pub async fn find_servers(
        &self,
        endpoint_uri: &str,
        server_uris: &[String],
        locale_ids: &[String],
    ) -> Result<Vec<ApplicationConfig>, EdgeError> {
        discovery::find_servers::execute(&self.inner, endpoint_uri, server_uris, locale_ids).await
    }

    /// Disconnects the client session addressed by the endpoint, tearing
    /// down its subscriptions and publish task.
    pub async fn disconnect_client(&self, endpoint: &EndpointInfo) -> Result<(), EdgeError> {
        let msg = EdgeMessage::stop_client(&endpoint.endpoint_uri);
        self.inner.disconnect_session(&msg).await;
        Ok(())
    }

    /// Stops the queue subsystem. Queued but unprocessed messages are
    /// destroyed. `send_request` restarts the queues on next use.
    pub async fn shutdown(&self) {
        self.inner.shutdown_queues().await;
    }

    /// Starts the hosted server on the endpoint.
    pub fn create_server(&self, endpoint: &EndpointInfo) -> Result<(), EdgeError> {
        self.inner.server.start(endpoint)?;
        self.inner.status_event(endpoint, StatusEvent::ServerStarted);
        Ok(())
    }

    /// Stops the hosted server.
    pub fn close_server(&self, endpoint: &EndpointInfo) -> Result<(), EdgeError> {
        self.inner.server.stop(endpoint)?;
        self.inner.status_event(endpoint, StatusEvent::StopServer);
        Ok(())
    }

    /// Creates a namespace in the hosted server.
    pub fn create_namespace(
        &self,
        name: &str,
        root_node_id: &str,
        root_browse_name: &str,
        root_display_name: &str,
    ) -> Result<(), EdgeError> {
        self.inner.server.backend()?.create_namespace(
            name,
            root_node_id,
            root_browse_name,
            root_display_name,
        )
    }

    /// Adds a node to the hosted server.
    pub fn create_node(&self, namespace_uri: &str, item: &NodeItem) -> Result<(), EdgeError> {
        self.inner.server.backend()?.create_node(namespace_uri, item)
    }

    /// Adds a method node to the hosted server.
    pub fn create_method_node(
        &self,
        namespace_uri: &str,
        item: &NodeItem,
        method_name: &str,
    ) -> Result<(), EdgeError> {
        self.inner
            .server
            .backend()?
            .create_method_node(namespace_uri, item, method_name)
    }

    /// Adds a reference between two nodes of the hosted server.
    pub fn add_reference(&self, reference: &EdgeReference) -> Result<(), EdgeError> {
        self.inner.server.backend()?.add_reference(reference)
    }

    /// Replaces the value of a variable node of the hosted server.
    pub fn modify_variable_node(
        &self,
        namespace_uri: &str,
        node_uri: &str,
        value: &EdgeVariant,
    ) -> Result<(), EdgeError> {
        self.inner
            .server
            .backend()?
            .modify_variable_node(namespace_uri, node_uri, value)
    }
}

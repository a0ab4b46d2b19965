// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The hosted-server façade.
//!
//! The adapter does not own an address space; node storage and the server
//! transport are an opaque backend supplied by the embedder. This module
//! only guards the lifecycle (one server instance at a time) and passes
//! node management calls through.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, warn};
use opcua_edge_types::{EdgeError, EdgeNodeId, EdgeVariant, EndpointInfo};

/// A node to create in the hosted server's address space.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeItem {
    /// Browse name of the node.
    pub browse_name: String,
    /// Display name of the node.
    pub display_name: String,
    /// Explicit node id, when the caller wants one.
    pub node_id: Option<EdgeNodeId>,
    /// Initial value for variable nodes.
    pub value: Option<EdgeVariant>,
}

/// A reference to add between two nodes of the hosted server.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeReference {
    /// Path of the source node.
    pub source_path: String,
    /// Path of the target node.
    pub target_path: String,
    /// True for a forward reference.
    pub forward: bool,
}

/// The node store and transport of a hosted server.
pub trait ServerBackend: Send + Sync + 'static {
    /// Brings the server up on the endpoint.
    fn start_server(&self, endpoint: &EndpointInfo) -> Result<(), EdgeError>;

    /// Takes the server down.
    fn stop_server(&self, endpoint: &EndpointInfo) -> Result<(), EdgeError>;

    /// Creates a namespace with its root node.
    fn create_namespace(
        &self,
        name: &str,
        root_node_id: &str,
        root_browse_name: &str,
        root_display_name: &str,
    ) -> Result<(), EdgeError>;

    /// Adds a node to a namespace.
    fn create_node(&self, namespace_uri: &str, item: &NodeItem) -> Result<(), EdgeError>;

    /// Adds a method node to a namespace.
    fn create_method_node(
        &self,
        namespace_uri: &str,
        item: &NodeItem,
        method_name: &str,
    ) -> Result<(), EdgeError>;

    /// Adds a reference between two nodes.
    fn add_reference(&self, reference: &EdgeReference) -> Result<(), EdgeError>;

    /// Replaces the value of a variable node.
    fn modify_variable_node(
        &self,
        namespace_uri: &str,
        node_uri: &str,
        value: &EdgeVariant,
    ) -> Result<(), EdgeError>;
}

/// Lifecycle guard around the backend: at most one running server.
pub(crate) struct ServerLifecycle {
    backend: Option<Arc<dyn ServerBackend>>,
    initialized: AtomicBool,
}

impl ServerLifecycle {
    pub fn new(backend: Option<Arc<dyn ServerBackend>>) -> ServerLifecycle {
        ServerLifecycle {
            backend,
            initialized: AtomicBool::new(false),
        }
    }

    /// The backend, or `NotSupport` when the adapter was built without
    /// one.
    pub fn backend(&self) -> Result<&Arc<dyn ServerBackend>, EdgeError> {
        self.backend.as_ref().ok_or(EdgeError::NotSupport)
    }

    pub fn start(&self, endpoint: &EndpointInfo) -> Result<(), EdgeError> {
        let backend = self.backend()?;
        if let Some(config) = &endpoint.endpoint_config {
            if config.bind_port == 0 {
                error!("cannot start a server on port 0");
                return Err(EdgeError::ParamInvalid("bind port is invalid"));
            }
        }
        if self.initialized.load(Ordering::SeqCst) {
            warn!("server is already initialized");
            return Err(EdgeError::AlreadyInit);
        }
        backend.start_server(endpoint)?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn stop(&self, endpoint: &EndpointInfo) -> Result<(), EdgeError> {
        let backend = self.backend()?;
        if !self.initialized.load(Ordering::SeqCst) {
            warn!("no server is running");
            return Err(EdgeError::ParamInvalid("no server is running"));
        }
        backend.stop_server(endpoint)?;
        self.initialized.store(false, Ordering::SeqCst);
        Ok(())
    }

    #[allow(unused)]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Callbacks the application registers with [`crate::EdgeManager::configure`].
//!
//! You may implement the traits on your own types, or use the closure
//! wrappers for a simple collection of functions. A callback borrows the
//! message for the duration of the call; the queue reclaims it afterwards.

use opcua_edge_types::{Device, EdgeMessage, EndpointInfo, StatusEvent};

/// Receives the messages taken off the receive queue, split by message
/// type.
pub trait ResponseCallback: Send + Sync {
    /// Called for every `GeneralResponse` message.
    fn on_response(&self, msg: &EdgeMessage);

    /// Called for every `BrowseResponse` message.
    fn on_browse(&self, msg: &EdgeMessage);

    /// Called for every `Report` message from a monitored item.
    fn on_monitored(&self, msg: &EdgeMessage);

    /// Called for every `Error` message.
    fn on_error(&self, msg: &EdgeMessage);
}

/// Receives session and server lifecycle events.
pub trait StatusCallback: Send + Sync {
    /// A server or client came up.
    fn on_start(&self, endpoint: &EndpointInfo, status: StatusEvent);

    /// A server or client went down.
    fn on_stop(&self, endpoint: &EndpointInfo, status: StatusEvent);

    /// The transport connection changed state.
    fn on_network(&self, endpoint: &EndpointInfo, status: StatusEvent);
}

/// Receives the devices found by GetEndpoints.
pub trait DiscoveryCallback: Send + Sync {
    /// A device with at least one valid endpoint was found.
    fn on_endpoint_found(&self, device: &Device);
}

type MessageCallbackFun = dyn Fn(&EdgeMessage) + Send + Sync;
type StatusCallbackFun = dyn Fn(&EndpointInfo, StatusEvent) + Send + Sync;
type DeviceCallbackFun = dyn Fn(&Device) + Send + Sync;

/// A convenient wrapper around four closures that implements
/// [`ResponseCallback`].
pub struct ResponseCallbacks {
    response: Box<MessageCallbackFun>,
    browse: Box<MessageCallbackFun>,
    monitored: Box<MessageCallbackFun>,
    error: Box<MessageCallbackFun>,
}

impl ResponseCallbacks {
    /// Create a new response callback wrapper.
    ///
    /// # Arguments
    ///
    /// * `response` - Called for each general response.
    /// * `browse` - Called for each browse response.
    /// * `monitored` - Called for each monitored item report.
    /// * `error` - Called for each error message.
    pub fn new(
        response: impl Fn(&EdgeMessage) + Send + Sync + 'static,
        browse: impl Fn(&EdgeMessage) + Send + Sync + 'static,
        monitored: impl Fn(&EdgeMessage) + Send + Sync + 'static,
        error: impl Fn(&EdgeMessage) + Send + Sync + 'static,
    ) -> Self {
        Self {
            response: Box::new(response),
            browse: Box::new(browse),
            monitored: Box::new(monitored),
            error: Box::new(error),
        }
    }
}

impl ResponseCallback for ResponseCallbacks {
    fn on_response(&self, msg: &EdgeMessage) {
        (self.response)(msg);
    }

    fn on_browse(&self, msg: &EdgeMessage) {
        (self.browse)(msg);
    }

    fn on_monitored(&self, msg: &EdgeMessage) {
        (self.monitored)(msg);
    }

    fn on_error(&self, msg: &EdgeMessage) {
        (self.error)(msg);
    }
}

/// A convenient wrapper around three closures that implements
/// [`StatusCallback`].
pub struct StatusCallbacks {
    start: Box<StatusCallbackFun>,
    stop: Box<StatusCallbackFun>,
    network: Box<StatusCallbackFun>,
}

impl StatusCallbacks {
    /// Create a new status callback wrapper.
    pub fn new(
        start: impl Fn(&EndpointInfo, StatusEvent) + Send + Sync + 'static,
        stop: impl Fn(&EndpointInfo, StatusEvent) + Send + Sync + 'static,
        network: impl Fn(&EndpointInfo, StatusEvent) + Send + Sync + 'static,
    ) -> Self {
        Self {
            start: Box::new(start),
            stop: Box::new(stop),
            network: Box::new(network),
        }
    }
}

impl StatusCallback for StatusCallbacks {
    fn on_start(&self, endpoint: &EndpointInfo, status: StatusEvent) {
        (self.start)(endpoint, status);
    }

    fn on_stop(&self, endpoint: &EndpointInfo, status: StatusEvent) {
        (self.stop)(endpoint, status);
    }

    fn on_network(&self, endpoint: &EndpointInfo, status: StatusEvent) {
        (self.network)(endpoint, status);
    }
}

/// A wrapper around an endpoint-found closure that implements
/// [`DiscoveryCallback`].
pub struct DiscoveryCallbacks {
    endpoint_found: Box<DeviceCallbackFun>,
}

impl DiscoveryCallbacks {
    /// Create a new discovery callback wrapper.
    pub fn new(endpoint_found: impl Fn(&Device) + Send + Sync + 'static) -> Self {
        Self {
            endpoint_found: Box::new(endpoint_found),
        }
    }
}

impl DiscoveryCallback for DiscoveryCallbacks {
    fn on_endpoint_found(&self, device: &Device) {
        (self.endpoint_found)(device);
    }
}

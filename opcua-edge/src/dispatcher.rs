// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The glue between the queues, the session registry, the command
//! executors and the application callbacks.
//!
//! Messages taken off the send queue are routed by command; messages taken
//! off the receive queue are routed by message type to the registered
//! callback. The queue pair is created lazily and exactly once.

use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use log::{debug, error, warn};
use opcua_edge_types::{
    ApplicationTypeMask, EdgeCommand, EdgeError, EdgeMessage, EdgeResponse, EdgeStatusCode,
    EdgeVariant, EndpointInfo, MessageType, StatusCode, StatusEvent,
};
use parking_lot::Mutex;

use crate::callbacks::{DiscoveryCallback, ResponseCallback, StatusCallback};
use crate::command;
use crate::queue::{MessageProcessor, MessageQueue};
use crate::server::ServerLifecycle;
use crate::session::{ConnectError, SessionRegistry};
use crate::stack::UaConnector;
use crate::subscription;

/// Everything `configure` registers, swapped in atomically as one unit.
pub(crate) struct AdapterConfig {
    pub response: Arc<dyn ResponseCallback>,
    pub status: Arc<dyn StatusCallback>,
    pub discovery: Arc<dyn DiscoveryCallback>,
    pub supported_types: ApplicationTypeMask,
}

pub(crate) struct QueuePair {
    pub send: MessageQueue,
    pub recv: MessageQueue,
}

/// Shared state of one adapter instance.
pub(crate) struct AdapterInner {
    pub connector: Arc<dyn UaConnector>,
    pub config: ArcSwapOption<AdapterConfig>,
    pub registry: SessionRegistry,
    pub server: ServerLifecycle,
    queues: Mutex<Option<Arc<QueuePair>>>,
}

impl AdapterInner {
    pub fn new(connector: Arc<dyn UaConnector>, server: ServerLifecycle) -> AdapterInner {
        AdapterInner {
            connector,
            config: ArcSwapOption::empty(),
            registry: SessionRegistry::new(),
            server,
            queues: Mutex::new(None),
        }
    }

    /// Starts the queue pair if it is not running yet. Calling this again
    /// afterwards observes the guard and does nothing.
    pub fn init_queues(self: &Arc<Self>) {
        let mut queues = self.queues.lock();
        if queues.is_some() {
            debug!("queue subsystem is initialized already");
            return;
        }
        let send = MessageQueue::start(
            "send",
            Arc::new(SendProcessor {
                inner: Arc::downgrade(self),
            }),
        );
        let recv = MessageQueue::start(
            "recv",
            Arc::new(RecvProcessor {
                inner: Arc::downgrade(self),
            }),
        );
        *queues = Some(Arc::new(QueuePair { send, recv }));
    }

    /// Stops both queues and forgets them. Safe to call when they were
    /// never started.
    pub async fn shutdown_queues(&self) {
        let queues = self.queues.lock().take();
        if let Some(queues) = queues {
            queues.send.stop().await;
            queues.recv.stop().await;
        }
    }

    pub fn push_send(&self, msg: EdgeMessage) -> Result<(), EdgeError> {
        let queues = self.queues.lock().clone();
        match queues {
            Some(queues) => queues.send.push(msg),
            None => Err(EdgeError::Enqueue),
        }
    }

    /// Puts a message on the receive queue. Failures end the message's
    /// life here; there is nobody left to report them to but the log.
    pub fn push_recv(&self, msg: EdgeMessage) {
        let queues = self.queues.lock().clone();
        match queues {
            Some(queues) => {
                if queues.recv.push(msg).is_err() {
                    warn!("receive queue is stopped, dropping message");
                }
            }
            None => warn!("receive queue does not exist, dropping message"),
        }
    }

    pub fn config(&self) -> Option<Arc<AdapterConfig>> {
        self.config.load_full()
    }

    pub fn supported_types(&self) -> ApplicationTypeMask {
        self.config()
            .map(|c| c.supported_types)
            .unwrap_or(ApplicationTypeMask::empty())
    }

    /// Builds an Error message correlated with `origin` and puts it on the
    /// receive queue.
    pub fn send_error_response(&self, origin: &EdgeMessage, code: EdgeStatusCode, desc: &str) {
        self.push_recv(error_message(origin, code, desc));
    }

    pub fn status_event(&self, endpoint: &EndpointInfo, event: StatusEvent) {
        if let Some(config) = self.config() {
            match event {
                StatusEvent::ServerStarted | StatusEvent::ClientStarted => {
                    config.status.on_start(endpoint, event)
                }
                StatusEvent::StopServer | StatusEvent::StopClient => {
                    config.status.on_stop(endpoint, event)
                }
                StatusEvent::Connected | StatusEvent::Disconnected => {
                    config.status.on_network(endpoint, event)
                }
            }
        }
    }

    async fn connect_client(self: &Arc<Self>, msg: &EdgeMessage) {
        match self
            .registry
            .connect(&*self.connector, &msg.endpoint_info.endpoint_uri)
            .await
        {
            Ok(_) => self.status_event(&msg.endpoint_info, StatusEvent::ClientStarted),
            Err(ConnectError::AlreadyConnected) => {
                warn!(
                    "client is already connected to {}",
                    msg.endpoint_info.endpoint_uri
                );
            }
            Err(ConnectError::InvalidUri) => {
                error!("endpoint uri {} is invalid", msg.endpoint_info.endpoint_uri);
            }
            Err(ConnectError::Service(status)) => {
                error!(
                    "unable to connect to {}: {}",
                    msg.endpoint_info.endpoint_uri, status
                );
            }
        }
    }

    pub async fn disconnect_session(self: &Arc<Self>, msg: &EdgeMessage) {
        let Some(handle) = self.registry.remove(&msg.endpoint_info.endpoint_uri) else {
            warn!(
                "no client session for {}",
                msg.endpoint_info.endpoint_uri
            );
            return;
        };
        subscription::shutdown(&handle).await;
        if let Err(status) = handle.session.disconnect().await {
            warn!("disconnect of {} returned {}", handle.endpoint_key, status);
        }
        self.status_event(&msg.endpoint_info, StatusEvent::StopClient);
    }

    async fn handle_send(self: &Arc<Self>, msg: EdgeMessage) {
        match msg.command {
            EdgeCommand::StartServer => match self.server.start(&msg.endpoint_info) {
                Ok(()) => self.status_event(&msg.endpoint_info, StatusEvent::ServerStarted),
                Err(e) => error!("unable to start the server: {e}"),
            },
            EdgeCommand::StopServer => match self.server.stop(&msg.endpoint_info) {
                Ok(()) => self.status_event(&msg.endpoint_info, StatusEvent::StopServer),
                Err(e) => error!("unable to stop the server: {e}"),
            },
            EdgeCommand::StartClient => self.connect_client(&msg).await,
            EdgeCommand::StopClient => self.disconnect_session(&msg).await,
            EdgeCommand::Read | EdgeCommand::ReadSamplingInterval => {
                self.with_session(&msg, command::read::execute_read).await
            }
            EdgeCommand::Write => self.with_session(&msg, command::write::execute_write).await,
            EdgeCommand::Method => {
                self.with_session(&msg, command::method::execute_method)
                    .await
            }
            EdgeCommand::Sub => {
                let Some(handle) = self.registry.get(&msg.endpoint_info.endpoint_uri) else {
                    self.session_missing(&msg);
                    return;
                };
                command::subscription::execute_subscription(self, &handle, &msg).await;
            }
            EdgeCommand::Browse | EdgeCommand::BrowseView => {
                self.with_session(&msg, command::browse::execute_browse)
                    .await
            }
        }
    }

    async fn with_session<F, Fut>(self: &Arc<Self>, msg: &EdgeMessage, executor: F)
    where
        F: FnOnce(Arc<AdapterInner>, Arc<crate::session::SessionHandle>, EdgeMessage) -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        let Some(handle) = self.registry.get(&msg.endpoint_info.endpoint_uri) else {
            self.session_missing(msg);
            return;
        };
        executor(self.clone(), handle, msg.clone()).await;
    }

    fn session_missing(&self, msg: &EdgeMessage) {
        error!(
            "no client session for {}",
            msg.endpoint_info.endpoint_uri
        );
        self.send_error_response(
            msg,
            EdgeStatusCode::Service(StatusCode::BadServerNotConnected),
            "Client session is not available",
        );
    }

    fn handle_recv(&self, msg: EdgeMessage) {
        let Some(config) = self.config() else {
            warn!("no response callback registered, dropping message");
            return;
        };
        match msg.message_type {
            MessageType::GeneralResponse => config.response.on_response(&msg),
            MessageType::BrowseResponse => config.response.on_browse(&msg),
            MessageType::Report => config.response.on_monitored(&msg),
            MessageType::Error => config.response.on_error(&msg),
            MessageType::SendRequest | MessageType::SendRequests => {
                warn!("request message on the receive queue, dropping it")
            }
        }
    }
}

/// Builds an Error message carrying `desc` as its single response, bound
/// to the failed request by `message_id`.
pub(crate) fn error_message(
    origin: &EdgeMessage,
    code: EdgeStatusCode,
    desc: &str,
) -> EdgeMessage {
    let mut msg = EdgeMessage::new(
        origin.endpoint_info.clone(),
        origin.command,
        MessageType::Error,
    );
    msg.message_id = origin.message_id;
    msg.result = Some(code);
    msg.responses = vec![EdgeResponse {
        value: Some(EdgeVariant::String(desc.to_string())),
        ..Default::default()
    }];
    msg
}

struct SendProcessor {
    inner: Weak<AdapterInner>,
}

#[async_trait]
impl MessageProcessor for SendProcessor {
    async fn process(&self, msg: EdgeMessage) {
        if let Some(inner) = self.inner.upgrade() {
            inner.handle_send(msg).await;
        }
    }
}

struct RecvProcessor {
    inner: Weak<AdapterInner>,
}

#[async_trait]
impl MessageProcessor for RecvProcessor {
    async fn process(&self, msg: EdgeMessage) {
        if let Some(inner) = self.inner.upgrade() {
            inner.handle_recv(msg);
        }
    }
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Per-session subscription state and the publish task.
//!
//! Monitored items are keyed by their wire alias. The first subscription
//! of a session spawns one publish task which cycles a manual publish
//! request every [`crate::MINIMUM_PUBLISHING_TIME_MS`] milliseconds; the
//! task is cancelled and joined when the last subscription goes away.

use std::sync::Arc;
use std::time::Duration;

use hashbrown::HashMap;
use log::{debug, warn};
use opcua_edge_types::EdgeMessage;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::constants::MINIMUM_PUBLISHING_TIME_MS;
use crate::session::SessionHandle;
use crate::stack::UaSession;

/// Bookkeeping of one monitored item. The message that created the item
/// is owned here and dropped with the entry.
pub(crate) struct SubscriptionInfo {
    /// Deep copy of the message that created the item.
    pub msg: EdgeMessage,
    /// Server assigned subscription the item belongs to.
    pub subscription_id: u32,
    /// Server assigned id of the item.
    pub monitored_item_id: u32,
}

/// The publish task of one session.
pub(crate) struct PublishTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PublishTask {
    /// Signals the task to stop and waits for it to finish its cycle.
    pub async fn stop(self) {
        self.cancel.cancel();
        if self.handle.await.is_err() {
            warn!("publish task ended abnormally");
        }
    }
}

/// Subscription state of one session.
#[derive(Default)]
pub(crate) struct SubscriptionState {
    /// Monitored items keyed by wire alias.
    pub items: HashMap<String, SubscriptionInfo>,
    /// Number of live subscriptions. The publish task runs while this is
    /// non-zero.
    pub subscription_count: usize,
    publish: Option<PublishTask>,
}

impl SubscriptionState {
    /// True if any monitored item belongs to the subscription.
    pub fn has_subscription_id(&self, subscription_id: u32) -> bool {
        self.items
            .values()
            .any(|i| i.subscription_id == subscription_id)
    }

    /// True if the (subscription, monitored item) pair is already known.
    pub fn monitored_item_exists(&self, subscription_id: u32, monitored_item_id: u32) -> bool {
        self.items.values().any(|i| {
            i.subscription_id == subscription_id && i.monitored_item_id == monitored_item_id
        })
    }

    /// Starts the publish task for the session, if it is not running.
    pub fn spawn_publish(&mut self, session: Arc<dyn UaSession>) {
        if self.publish.is_some() {
            return;
        }
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(publish_loop(session, cancel.clone()));
        self.publish = Some(PublishTask { cancel, handle });
    }

    /// Detaches the publish task so the caller can stop it outside the
    /// state lock.
    pub fn take_publish(&mut self) -> Option<PublishTask> {
        self.publish.take()
    }

    /// True while the publish task is attached.
    #[allow(unused)]
    pub fn publish_running(&self) -> bool {
        self.publish.is_some()
    }
}

async fn publish_loop(session: Arc<dyn UaSession>, cancel: CancellationToken) {
    debug!("subscription publish task started");
    while !cancel.is_cancelled() {
        if let Err(status) = session.publish().await {
            warn!("publish request failed: {status}");
        }
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(Duration::from_millis(MINIMUM_PUBLISHING_TIME_MS)) => {}
        }
    }
    debug!("subscription publish task stopped");
}

/// Tears down the subscription state of a session: items are dropped and
/// the publish task, if any, is stopped and joined.
pub(crate) async fn shutdown(handle: &SessionHandle) {
    let publish = {
        let mut state = handle.subscriptions.lock();
        state.items.clear();
        state.subscription_count = 0;
        state.take_publish()
    };
    if let Some(task) = publish {
        task.stop().await;
    }
}

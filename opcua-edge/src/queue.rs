// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The queue engine: an unbounded FIFO with a dedicated worker task.
//!
//! `push` never blocks on I/O; the worker drains the list one message at a
//! time and hands each to the processor. Stopping is cooperative and
//! two-phased: the running flag is cleared, the worker is woken and the
//! caller waits for it to acknowledge by finishing. Messages still queued
//! at that point are destroyed, not delivered.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use opcua_edge_types::{EdgeError, EdgeMessage};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Consumes the messages taken off a queue.
#[async_trait]
pub(crate) trait MessageProcessor: Send + Sync + 'static {
    async fn process(&self, msg: EdgeMessage);
}

struct QueueState {
    list: VecDeque<EdgeMessage>,
    running: bool,
}

struct QueueInner {
    state: Mutex<QueueState>,
    notify: Notify,
}

/// A FIFO of messages with one worker task.
pub(crate) struct MessageQueue {
    name: &'static str,
    inner: Arc<QueueInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MessageQueue {
    /// Creates the queue and spawns its worker on the current runtime.
    pub fn start(name: &'static str, processor: Arc<dyn MessageProcessor>) -> MessageQueue {
        let inner = Arc::new(QueueInner {
            state: Mutex::new(QueueState {
                list: VecDeque::new(),
                running: true,
            }),
            notify: Notify::new(),
        });
        let worker = tokio::spawn(worker_loop(name, inner.clone(), processor));
        MessageQueue {
            name,
            inner,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Takes ownership of the message and appends it. Fails only when the
    /// queue has been stopped.
    pub fn push(&self, msg: EdgeMessage) -> Result<(), EdgeError> {
        {
            let mut state = self.inner.state.lock();
            if !state.running {
                return Err(EdgeError::Enqueue);
            }
            state.list.push_back(msg);
        }
        self.inner.notify.notify_one();
        Ok(())
    }

    /// Stops the worker and waits for it to acknowledge. In-flight
    /// processing runs to completion; messages still queued afterwards are
    /// dropped.
    pub async fn stop(&self) {
        {
            let mut state = self.inner.state.lock();
            if !state.running {
                return;
            }
            state.running = false;
        }
        self.inner.notify.notify_one();
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if worker.await.is_err() {
                debug!("{} queue worker ended abnormally", self.name);
            }
        }
        self.inner.state.lock().list.clear();
    }
}

async fn worker_loop(
    name: &'static str,
    inner: Arc<QueueInner>,
    processor: Arc<dyn MessageProcessor>,
) {
    debug!("{name} queue worker started");
    loop {
        let next = {
            let mut state = inner.state.lock();
            if !state.running {
                break;
            }
            state.list.pop_front()
        };
        match next {
            Some(msg) => processor.process(msg).await,
            // notify_one stores a permit when no worker is parked here, so
            // a push racing this await cannot be lost.
            None => inner.notify.notified().await,
        }
    }
    debug!("{name} queue worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use opcua_edge_types::{EdgeCommand, MessageType};
    use parking_lot::Mutex as PlMutex;
    use std::time::Duration;

    struct Recorder {
        seen: PlMutex<Vec<u32>>,
        notify: Notify,
    }

    #[async_trait]
    impl MessageProcessor for Recorder {
        async fn process(&self, msg: EdgeMessage) {
            self.seen.lock().push(msg.message_id);
            self.notify.notify_one();
        }
    }

    fn test_message(id: u32) -> EdgeMessage {
        let mut msg = EdgeMessage::start_client("opc.tcp://localhost:4840");
        msg.message_id = id;
        msg.command = EdgeCommand::StartClient;
        msg.message_type = MessageType::SendRequest;
        msg
    }

    #[tokio::test]
    async fn messages_are_processed_in_fifo_order() {
        let recorder = Arc::new(Recorder {
            seen: PlMutex::new(Vec::new()),
            notify: Notify::new(),
        });
        let queue = MessageQueue::start("test", recorder.clone());
        for id in 0..20u32 {
            queue.push(test_message(id)).unwrap();
        }
        while recorder.seen.lock().len() < 20 {
            recorder.notify.notified().await;
        }
        assert_eq!(*recorder.seen.lock(), (0..20).collect::<Vec<_>>());
        queue.stop().await;
    }

    #[tokio::test]
    async fn push_after_stop_is_rejected() {
        let recorder = Arc::new(Recorder {
            seen: PlMutex::new(Vec::new()),
            notify: Notify::new(),
        });
        let queue = MessageQueue::start("test", recorder);
        queue.stop().await;
        assert!(queue.push(test_message(1)).is_err());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let recorder = Arc::new(Recorder {
            seen: PlMutex::new(Vec::new()),
            notify: Notify::new(),
        });
        let queue = MessageQueue::start("test", recorder);
        queue.stop().await;
        queue.stop().await;
    }

    #[tokio::test]
    async fn slow_processor_does_not_block_push() {
        struct Sleeper;
        #[async_trait]
        impl MessageProcessor for Sleeper {
            async fn process(&self, _msg: EdgeMessage) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
        let queue = MessageQueue::start("test", Arc::new(Sleeper));
        let start = std::time::Instant::now();
        for id in 0..10u32 {
            queue.push(test_message(id)).unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
        queue.stop().await;
    }
}

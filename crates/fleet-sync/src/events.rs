//! Event bus carrying sync notifications to the operator surface

use fleet_core::SyncEvent;

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Event bus for refresh, command and connection notifications
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
    /// Last `max_history` events
    history: Arc<RwLock<VecDeque<SyncEvent>>>,
    max_history: usize,
    event_count: Arc<RwLock<u64>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);

        Self {
            sender,
            history: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            max_history: capacity,
            event_count: Arc::new(RwLock::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: SyncEvent) {
        {
            let mut history = self.history.write();
            history.push_back(event.clone());
            if history.len() > self.max_history {
                history.pop_front();
            }
        }

        *self.event_count.write() += 1;

        let _ = self.sender.send(event);

        debug!("Event published, total: {}", self.event_count());
    }

    pub fn recent(&self, count: usize) -> Vec<SyncEvent> {
        let history = self.history.read();
        let start = history.len().saturating_sub(count);
        history.iter().skip(start).cloned().collect()
    }

    pub fn event_count(&self) -> u64 {
        *self.event_count.read()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

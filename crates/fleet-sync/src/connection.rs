//! Backend link indicator

use crate::events::EventBus;
use fleet_core::{ConnectionState, SyncEvent};
use fleet_telemetry::SyncMetrics;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Source of the "synced with backend" indicator.
///
/// A push transport can implement this in place of the simulated handshake.
pub trait ConnectionMonitor: Send + Sync {
    fn state(&self) -> ConnectionState;

    fn subscribe(&self) -> watch::Receiver<ConnectionState>;
}

/// Reports `CONNECTED` once, a fixed delay after [`start`].
///
/// Never reconnects and never enters `DISCONNECTED`; losing the service only
/// shows up as stale data.
///
/// [`start`]: SimulatedHandshake::start
pub struct SimulatedHandshake {
    delay: Duration,
    state: Arc<watch::Sender<ConnectionState>>,
    started: AtomicBool,
    events: EventBus,
    metrics: Arc<SyncMetrics>,
}

impl SimulatedHandshake {
    pub fn new(delay: Duration, events: EventBus, metrics: Arc<SyncMetrics>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        metrics.set_connection_state(ConnectionState::Connecting);

        Self {
            delay,
            state: Arc::new(state),
            started: AtomicBool::new(false),
            events,
            metrics,
        }
    }

    /// Arm the handshake timer. Only the first call does anything.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            return None;
        }

        let delay = self.delay;
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let metrics = Arc::clone(&self.metrics);

        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_replace(ConnectionState::Connected);
            metrics.set_connection_state(ConnectionState::Connected);
            events.publish(SyncEvent::connection_changed(ConnectionState::Connected));
            info!("🔗 Connected to fleet service");
        }))
    }
}

impl ConnectionMonitor for SimulatedHandshake {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

//! # Fleet Sync - State Synchronization Engine
//!
//! Keeps a local mirror of the fleet service consistent and drives control
//! commands against it.
//!
//! ## Components
//! - [`ResourceStore`]: replace-only owner of drones, orders and metrics
//! - [`FetchScheduler`]: fan-out refresh on an interval and on demand
//! - [`SimulatedHandshake`]: the [`ConnectionMonitor`] shipped today
//! - [`CommandDispatcher`]: control operations followed by a resync
//! - [`EventBus`]: notifications for the operator surface

pub mod commands;
pub mod connection;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod testing;

pub use commands::{Command, CommandDispatcher, DroneForm, OrderForm, ResetConfirmation};
pub use connection::{ConnectionMonitor, SimulatedHandshake};
pub use error::{CommandError, CommandResult};
pub use events::EventBus;
pub use scheduler::{FetchScheduler, RefreshReport};
pub use store::{
    Collection, FetchFailure, ReconcilePolicy, Reconciled, ResourceStore, StoreSnapshot,
};

use fleet_client::FleetApi;
use fleet_telemetry::SyncMetrics;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Synchronization engine configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Period of the repeating refresh
    pub poll_interval: Duration,
    /// Delay before the simulated handshake reports connected
    pub handshake_delay: Duration,
    pub reconcile_policy: ReconcilePolicy,
    /// Capacity of the event bus channel and history
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            handshake_delay: Duration::from_millis(1500),
            reconcile_policy: ReconcilePolicy::LastWriteWins,
            event_capacity: 256,
        }
    }
}

/// The wired-up engine
pub struct FleetSync {
    config: SyncConfig,
    store: Arc<ResourceStore>,
    scheduler: Arc<FetchScheduler>,
    dispatcher: CommandDispatcher,
    connection: SimulatedHandshake,
    events: EventBus,
    metrics: Arc<SyncMetrics>,
}

impl FleetSync {
    pub fn new(config: SyncConfig, api: Arc<dyn FleetApi>) -> anyhow::Result<Self> {
        info!(
            "Initializing sync engine ({} reconciliation)",
            config.reconcile_policy
        );

        let metrics = Arc::new(SyncMetrics::new()?);
        let events = EventBus::new(config.event_capacity);
        let store = Arc::new(ResourceStore::new(config.reconcile_policy));

        let scheduler = Arc::new(FetchScheduler::new(
            Arc::clone(&api),
            Arc::clone(&store),
            events.clone(),
            Arc::clone(&metrics),
        ));
        let dispatcher = CommandDispatcher::new(
            api,
            Arc::clone(&scheduler),
            events.clone(),
            Arc::clone(&metrics),
        );
        let connection = SimulatedHandshake::new(
            config.handshake_delay,
            events.clone(),
            Arc::clone(&metrics),
        );

        Ok(Self {
            config,
            store,
            scheduler,
            dispatcher,
            connection,
            events,
            metrics,
        })
    }

    /// Arm the handshake and start polling. Polling runs until `shutdown` resolves.
    pub fn start(&self, shutdown: impl Future<Output = ()> + Send + 'static) -> JoinHandle<()> {
        self.connection.start();
        let scheduler = Arc::clone(&self.scheduler);
        tokio::spawn(scheduler.run(self.config.poll_interval, shutdown))
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    pub fn scheduler(&self) -> &Arc<FetchScheduler> {
        &self.scheduler
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn connection(&self) -> &dyn ConnectionMonitor {
        &self.connection
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::quiet_api;
    use fleet_core::ConnectionState;

    #[tokio::test(start_paused = true)]
    async fn test_engine_start_connects_and_polls() {
        let sync = FleetSync::new(SyncConfig::default(), Arc::new(quiet_api())).unwrap();
        assert_eq!(sync.connection().state(), ConnectionState::Connecting);

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let poller = sync.start(async move {
            let _ = stop_rx.await;
        });

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sync.connection().state(), ConnectionState::Connected);
        assert_eq!(sync.scheduler().current_generation(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sync.scheduler().current_generation(), 2);

        stop_tx.send(()).unwrap();
        poller.await.unwrap();

        let export = sync.metrics().export().unwrap();
        assert!(export.contains("fleet_dashboard_connected 1"));
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.handshake_delay, Duration::from_millis(1500));
        assert_eq!(config.reconcile_policy, ReconcilePolicy::LastWriteWins);
    }
}

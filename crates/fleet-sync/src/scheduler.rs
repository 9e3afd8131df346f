//! Fetch scheduler: fan-out retrieval of the mirrored resources

use crate::events::EventBus;
use crate::store::{Collection, Reconciled, ResourceStore};
use fleet_client::{ClientResult, FleetApi};
use fleet_core::{Resource, SyncEvent};
use fleet_telemetry::{Outcome, SyncMetrics};

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Result of one refresh cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub generation: u64,
    /// Resources whose fetch failed and kept their previous value
    pub failed: Vec<Resource>,
    /// Resources fetched successfully but dropped as stale
    pub discarded: Vec<Resource>,
}

impl RefreshReport {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            failed: Vec::new(),
            discarded: Vec::new(),
        }
    }

    fn record(&mut self, resource: Resource, outcome: Outcome) {
        match outcome {
            Outcome::Success => {}
            Outcome::Failure => self.failed.push(resource),
            Outcome::Discarded => self.discarded.push(resource),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Pulls drones, orders and metrics from the fleet service into the store.
///
/// Refreshes are neither de-duplicated nor cancelled. Overlapping cycles run
/// concurrently and reconcile through the store's [`ReconcilePolicy`].
///
/// [`ReconcilePolicy`]: crate::store::ReconcilePolicy
pub struct FetchScheduler {
    api: Arc<dyn FleetApi>,
    store: Arc<ResourceStore>,
    events: EventBus,
    metrics: Arc<SyncMetrics>,
    /// Last generation handed out; the first refresh is generation 1
    generation: AtomicU64,
    in_flight: AtomicUsize,
}

impl FetchScheduler {
    pub fn new(
        api: Arc<dyn FleetApi>,
        store: Arc<ResourceStore>,
        events: EventBus,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            api,
            store,
            events,
            metrics,
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    /// True while at least one refresh cycle has not finished all its fetches
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetch all three resources concurrently. Each result is applied as soon
    /// as it arrives; the loading flag clears once all three have settled.
    pub async fn refresh_all(&self) -> RefreshReport {
        let (generation, started) = self.begin();

        let (drones, orders, metrics) = tokio::join!(
            self.sync(Resource::Drones, generation),
            self.sync(Resource::Orders, generation),
            self.sync(Resource::Metrics, generation),
        );

        let mut report = RefreshReport::new(generation);
        report.record(Resource::Drones, drones);
        report.record(Resource::Orders, orders);
        report.record(Resource::Metrics, metrics);

        self.finish(started, &report);
        report
    }

    /// Fetch a single resource with the same failure isolation as [`refresh_all`]
    ///
    /// [`refresh_all`]: FetchScheduler::refresh_all
    pub async fn refresh_resource(&self, resource: Resource) -> RefreshReport {
        let (generation, started) = self.begin();

        let outcome = self.sync(resource, generation).await;
        let mut report = RefreshReport::new(generation);
        report.record(resource, outcome);

        self.finish(started, &report);
        report
    }

    /// Run [`refresh_all`] on a spawned task and return immediately
    ///
    /// [`refresh_all`]: FetchScheduler::refresh_all
    pub fn request_refresh(self: &Arc<Self>) -> JoinHandle<RefreshReport> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.refresh_all().await })
    }

    /// Refresh immediately, then every `period` until `shutdown` resolves.
    ///
    /// Each tick spawns its refresh so a slow service never delays the timer.
    pub async fn run(self: Arc<Self>, period: Duration, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("🔄 Polling fleet service every {:?}", period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.request_refresh();
                }
                _ = &mut shutdown => {
                    info!("🛑 Polling stopped");
                    break;
                }
            }
        }
    }

    fn begin(&self) -> (u64, Instant) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.metrics.refresh_started();
        self.events.publish(SyncEvent::refresh_started(generation));
        debug!("Refresh {} started", generation);
        (generation, Instant::now())
    }

    fn finish(&self, started: Instant, report: &RefreshReport) {
        let elapsed = started.elapsed();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.metrics.refresh_finished(elapsed.as_secs_f64());
        self.events.publish(SyncEvent::refresh_completed(
            report.generation,
            report.failed.clone(),
        ));
        debug!(
            "Refresh {} finished in {:?} ({} failed)",
            report.generation,
            elapsed,
            report.failed.len()
        );
    }

    async fn fetch(&self, resource: Resource) -> ClientResult<Collection> {
        match resource {
            Resource::Drones => self.api.fetch_drones().await.map(Collection::Drones),
            Resource::Orders => self.api.fetch_orders().await.map(Collection::Orders),
            Resource::Metrics => self.api.fetch_metrics().await.map(Collection::Metrics),
        }
    }

    async fn sync(&self, resource: Resource, generation: u64) -> Outcome {
        let result = self.fetch(resource).await;
        self.reconcile(resource, generation, result)
    }

    fn reconcile(
        &self,
        resource: Resource,
        generation: u64,
        result: ClientResult<Collection>,
    ) -> Outcome {
        let outcome = match result {
            Ok(collection) => {
                let count = collection.len();
                match self.store.replace(generation, collection) {
                    Reconciled::Applied => {
                        if resource != Resource::Metrics {
                            self.metrics.set_store_items(resource, count);
                        }
                        self.events
                            .publish(SyncEvent::resource_replaced(resource, generation, count));
                        Outcome::Success
                    }
                    Reconciled::Discarded { applied } => {
                        debug!(
                            "Stale {} from refresh {} dropped, {} already applied",
                            resource, generation, applied
                        );
                        Outcome::Discarded
                    }
                }
            }
            Err(e) => match self.store.record_failure(resource, generation, e.to_string()) {
                Reconciled::Applied => {
                    warn!("Failed to fetch {}: {}", resource, e);
                    self.events
                        .publish(SyncEvent::fetch_failed(resource, generation, e.to_string()));
                    Outcome::Failure
                }
                Reconciled::Discarded { applied } => {
                    debug!(
                        "Stale {} failure from refresh {} dropped, {} already applied: {}",
                        resource, generation, applied, e
                    );
                    Outcome::Discarded
                }
            },
        };

        self.metrics.record_fetch(resource, outcome);
        outcome
    }
}

// ============================================================================
// TESTS
// ============================================================================

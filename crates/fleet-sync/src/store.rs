//! Resource store: the single owner of the mirrored collections.
//!
//! Collections are only ever replaced wholesale. Readers get cheap
//! `Arc` snapshots and never observe a half-applied fetch.

use chrono::{DateTime, Utc};
use fleet_core::{CoreError, Drone, MetricsSnapshot, Order, Resource};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// How results of overlapping refreshes are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Every successful fetch is applied; the last to resolve wins
    #[default]
    LastWriteWins,
    /// Results older than the last applied generation for a resource are dropped
    DiscardStale,
}

impl ReconcilePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcilePolicy::LastWriteWins => "last-write-wins",
            ReconcilePolicy::DiscardStale => "discard-stale",
        }
    }
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconcilePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "last-write-wins" => Ok(ReconcilePolicy::LastWriteWins),
            "discard-stale" => Ok(ReconcilePolicy::DiscardStale),
            _ => Err(CoreError::unknown_value("reconcile policy", s)),
        }
    }
}

/// A freshly fetched collection, ready to replace the stored one
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Drones(Vec<Drone>),
    Orders(Vec<Order>),
    Metrics(MetricsSnapshot),
}

impl Collection {
    pub fn resource(&self) -> Resource {
        match self {
            Collection::Drones(_) => Resource::Drones,
            Collection::Orders(_) => Resource::Orders,
            Collection::Metrics(_) => Resource::Metrics,
        }
    }

    /// Item count; the number of keys for metrics
    pub fn len(&self) -> usize {
        match self {
            Collection::Drones(drones) => drones.len(),
            Collection::Orders(orders) => orders.len(),
            Collection::Metrics(metrics) => metrics.0.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of offering a collection to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Applied,
    /// A newer generation was already applied for this resource
    Discarded { applied: u64 },
}

/// Last failed fetch of a resource
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub generation: u64,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Point-in-time view of the store
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub drones: Arc<Vec<Drone>>,
    pub orders: Arc<Vec<Order>>,
    pub metrics: Arc<MetricsSnapshot>,
    /// Resources whose most recent fetch failed
    pub failures: Vec<(Resource, FetchFailure)>,
}

#[derive(Default)]
struct StoreInner {
    drones: Arc<Vec<Drone>>,
    orders: Arc<Vec<Order>>,
    metrics: Arc<MetricsSnapshot>,
    applied: HashMap<Resource, u64>,
    failures: HashMap<Resource, FetchFailure>,
}

pub struct ResourceStore {
    policy: ReconcilePolicy,
    inner: RwLock<StoreInner>,
}

impl ResourceStore {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self {
            policy,
            inner: RwLock::new(StoreInner::default()),
        }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    pub fn drones(&self) -> Arc<Vec<Drone>> {
        self.inner.read().drones.clone()
    }

    pub fn orders(&self) -> Arc<Vec<Order>> {
        self.inner.read().orders.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsSnapshot> {
        self.inner.read().metrics.clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read();
        let mut failures: Vec<_> = inner
            .failures
            .iter()
            .map(|(resource, failure)| (*resource, failure.clone()))
            .collect();
        failures.sort_by_key(|(resource, _)| Resource::ALL.iter().position(|r| r == resource));

        StoreSnapshot {
            drones: inner.drones.clone(),
            orders: inner.orders.clone(),
            metrics: inner.metrics.clone(),
            failures,
        }
    }

    /// Generation of the last collection applied for `resource`
    pub fn applied_generation(&self, resource: Resource) -> Option<u64> {
        self.inner.read().applied.get(&resource).copied()
    }

    /// Replace one collection in full. Clears any recorded failure for it.
    pub fn replace(&self, generation: u64, collection: Collection) -> Reconciled {
        let resource = collection.resource();
        let mut inner = self.inner.write();

        if let Some(applied) = self.newer_applied(&inner, resource, generation) {
            debug!(
                "Discarding {} from generation {} (applied {})",
                resource, generation, applied
            );
            return Reconciled::Discarded { applied };
        }

        match collection {
            Collection::Drones(drones) => inner.drones = Arc::new(drones),
            Collection::Orders(orders) => inner.orders = Arc::new(orders),
            Collection::Metrics(metrics) => inner.metrics = Arc::new(metrics),
        }
        inner.applied.insert(resource, generation);
        inner.failures.remove(&resource);

        Reconciled::Applied
    }

    /// Record a failed fetch; the stored collection is left untouched.
    ///
    /// Under [`ReconcilePolicy::DiscardStale`] a failure older than the
    /// applied generation is dropped like a stale success.
    pub fn record_failure(
        &self,
        resource: Resource,
        generation: u64,
        reason: impl Into<String>,
    ) -> Reconciled {
        let mut inner = self.inner.write();

        if let Some(applied) = self.newer_applied(&inner, resource, generation) {
            debug!(
                "Discarding {} failure from generation {} (applied {})",
                resource, generation, applied
            );
            return Reconciled::Discarded { applied };
        }

        inner.failures.insert(
            resource,
            FetchFailure {
                generation,
                reason: reason.into(),
                at: Utc::now(),
            },
        );
        Reconciled::Applied
    }

    /// Applied generation newer than `generation`, when stale results are dropped
    fn newer_applied(
        &self,
        inner: &StoreInner,
        resource: Resource,
        generation: u64,
    ) -> Option<u64> {
        if self.policy != ReconcilePolicy::DiscardStale {
            return None;
        }
        inner
            .applied
            .get(&resource)
            .copied()
            .filter(|&applied| generation < applied)
    }

    pub fn last_failure(&self, resource: Resource) -> Option<FetchFailure> {
        self.inner.read().failures.get(&resource).cloned()
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new(ReconcilePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::DroneStatus;

    fn drones(names: &[&str]) -> Collection {
        Collection::Drones(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Drone::new(format!("d-{i}"), *name))
                .collect(),
        )
    }

    #[test]
    fn test_starts_empty() {
        let store = ResourceStore::default();
        let snapshot = store.snapshot();
        assert!(snapshot.drones.is_empty());
        assert!(snapshot.orders.is_empty());
        assert!(snapshot.metrics.is_empty());
        assert!(snapshot.failures.is_empty());
    }

    #[test]
    fn test_replace_is_wholesale() {
        let store = ResourceStore::default();
        store.replace(1, drones(&["Falcon", "Hawk", "Kite"]));
        store.replace(2, drones(&["Wren"]));

        let drones = store.drones();
        assert_eq!(drones.len(), 1);
        assert_eq!(drones[0].name, "Wren");
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_replace() {
        let store = ResourceStore::default();
        store.replace(1, drones(&["Falcon"]));
        let before = store.snapshot();

        let jay = Drone::new("d-9", "Jay").with_status(DroneStatus::Flying);
        store.replace(2, Collection::Drones(vec![jay]));

        assert_eq!(before.drones[0].name, "Falcon");
        assert_eq!(store.drones()[0].name, "Jay");
    }

    #[test]
    fn test_failure_leaves_collection_and_clears_on_success() {
        let store = ResourceStore::default();
        store.replace(1, Collection::Orders(vec![Order::new("o-1", "Ana")]));
        store.record_failure(Resource::Orders, 2, "503 Service Unavailable");

        assert_eq!(store.orders().len(), 1);
        let failure = store.last_failure(Resource::Orders).unwrap();
        assert_eq!(failure.generation, 2);
        assert_eq!(store.snapshot().failures.len(), 1);

        store.replace(3, Collection::Orders(Vec::new()));
        assert!(store.last_failure(Resource::Orders).is_none());
    }

    #[test]
    fn test_last_write_wins_applies_older_generation() {
        let store = ResourceStore::new(ReconcilePolicy::LastWriteWins);
        store.replace(5, drones(&["New"]));
        let outcome = store.replace(4, drones(&["Old"]));

        assert_eq!(outcome, Reconciled::Applied);
        assert_eq!(store.drones()[0].name, "Old");
        assert_eq!(store.applied_generation(Resource::Drones), Some(4));
    }

    #[test]
    fn test_discard_stale_drops_older_generation() {
        let store = ResourceStore::new(ReconcilePolicy::DiscardStale);
        store.replace(5, drones(&["New"]));
        let outcome = store.replace(4, drones(&["Old"]));

        assert_eq!(outcome, Reconciled::Discarded { applied: 5 });
        assert_eq!(store.drones()[0].name, "New");

        // generations are tracked per resource
        let outcome = store.replace(4, Collection::Orders(vec![Order::new("o-1", "Ana")]));
        assert_eq!(outcome, Reconciled::Applied);
    }

    #[test]
    fn test_discard_stale_drops_older_failure() {
        let store = ResourceStore::new(ReconcilePolicy::DiscardStale);
        store.replace(2, Collection::Orders(vec![Order::new("o-1", "Ana")]));

        let outcome = store.record_failure(Resource::Orders, 1, "connection reset");
        assert_eq!(outcome, Reconciled::Discarded { applied: 2 });
        assert!(store.last_failure(Resource::Orders).is_none());
        assert!(store.snapshot().failures.is_empty());

        // a failure from the newest cycle is still kept
        let outcome = store.record_failure(Resource::Orders, 3, "connection reset");
        assert_eq!(outcome, Reconciled::Applied);
        assert_eq!(store.last_failure(Resource::Orders).unwrap().generation, 3);
    }

    #[test]
    fn test_last_write_wins_keeps_older_failure() {
        let store = ResourceStore::new(ReconcilePolicy::LastWriteWins);
        store.replace(2, Collection::Orders(Vec::new()));

        let outcome = store.record_failure(Resource::Orders, 1, "connection reset");
        assert_eq!(outcome, Reconciled::Applied);
        assert!(store.last_failure(Resource::Orders).is_some());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "discard-stale".parse::<ReconcilePolicy>().unwrap(),
            ReconcilePolicy::DiscardStale
        );
        assert_eq!(
            "LAST_WRITE_WINS".parse::<ReconcilePolicy>().unwrap(),
            ReconcilePolicy::LastWriteWins
        );
        assert!("newest".parse::<ReconcilePolicy>().is_err());
    }
}

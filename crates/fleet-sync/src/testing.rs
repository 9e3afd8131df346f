//! Test doubles for the fleet service

use async_trait::async_trait;
use fleet_client::{ClientError, ClientResult, FleetApi};
use fleet_core::{Drone, MetricsSnapshot, NewDrone, NewOrder, Order};
use mockall::mock;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

mock! {
    pub Api {}

    #[async_trait]
    impl FleetApi for Api {
        async fn fetch_drones(&self) -> ClientResult<Vec<Drone>>;
        async fn fetch_orders(&self) -> ClientResult<Vec<Order>>;
        async fn fetch_metrics(&self) -> ClientResult<MetricsSnapshot>;
        async fn create_order(&self, order: &NewOrder) -> ClientResult<()>;
        async fn create_drone(&self, drone: &NewDrone) -> ClientResult<()>;
        async fn allocate_orders(&self) -> ClientResult<()>;
        async fn generate_random_order(&self) -> ClientResult<()>;
        async fn start_simulation(&self) -> ClientResult<()>;
        async fn reset_simulation(&self) -> ClientResult<()>;
    }
}

/// Mock answering every fetch with empty collections, any number of times
pub fn quiet_api() -> MockApi {
    let mut api = MockApi::new();
    api.expect_fetch_drones().returning(|| Ok(Vec::new()));
    api.expect_fetch_orders().returning(|| Ok(Vec::new()));
    api.expect_fetch_metrics().returning(|| Ok(MetricsSnapshot::default()));
    api
}

/// Fake whose drone or order fetches answer from a script, each after its own delay.
/// Used to force out-of-order completion between overlapping refreshes.
#[derive(Default)]
pub struct ScriptedApi {
    drone_responses: Mutex<VecDeque<(Duration, Vec<Drone>)>>,
    order_responses: Mutex<VecDeque<(Duration, ClientResult<Vec<Order>>)>>,
    pub drone_fetches: AtomicUsize,
}

impl ScriptedApi {
    pub fn new(script: Vec<(Duration, Vec<Drone>)>) -> Arc<Self> {
        Arc::new(Self {
            drone_responses: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    /// Script the order fetches instead; drone fetches answer empty at once
    pub fn with_orders(script: Vec<(Duration, ClientResult<Vec<Order>>)>) -> Arc<Self> {
        Arc::new(Self {
            order_responses: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    pub fn fetches(&self) -> usize {
        self.drone_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FleetApi for ScriptedApi {
    async fn fetch_drones(&self) -> ClientResult<Vec<Drone>> {
        self.drone_fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.drone_responses.lock().pop_front();
        match next {
            Some((delay, drones)) => {
                tokio::time::sleep(delay).await;
                Ok(drones)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_orders(&self) -> ClientResult<Vec<Order>> {
        let next = self.order_responses.lock().pop_front();
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_metrics(&self) -> ClientResult<MetricsSnapshot> {
        Ok(MetricsSnapshot::default())
    }

    async fn create_order(&self, _order: &NewOrder) -> ClientResult<()> {
        Err(ClientError::transport("not scripted"))
    }

    async fn create_drone(&self, _drone: &NewDrone) -> ClientResult<()> {
        Err(ClientError::transport("not scripted"))
    }

    async fn allocate_orders(&self) -> ClientResult<()> {
        Ok(())
    }

    async fn generate_random_order(&self) -> ClientResult<()> {
        Ok(())
    }

    async fn start_simulation(&self) -> ClientResult<()> {
        Ok(())
    }

    async fn reset_simulation(&self) -> ClientResult<()> {
        Ok(())
    }
}

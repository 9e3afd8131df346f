//! # Fleet Client
//!
//! REST client for the fleet-management service. The dashboard never
//! computes allocation, routing or simulation itself; it only reads the
//! three collections and posts control commands through [`FleetApi`].
//!
//! No request carries authentication, pagination parameters or a timeout.

pub mod error;

pub use error::{ClientError, ClientResult};

use async_trait::async_trait;
use fleet_core::{Drone, MetricsSnapshot, NewDrone, NewOrder, Order};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Default location of the fleet-management service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

pub const DRONES_PATH: &str = "/api/drones";
pub const ORDERS_PATH: &str = "/api/orders";
pub const METRICS_PATH: &str = "/api/drones/metrics";
pub const ALLOCATE_PATH: &str = "/api/orders/allocate";
pub const GENERATE_ORDER_PATH: &str = "/api/simulation/generate-order";
pub const START_SIMULATION_PATH: &str = "/api/simulation/start";
pub const RESET_SIMULATION_PATH: &str = "/api/simulation/reset";

/// Operations offered by the fleet-management service
#[async_trait]
pub trait FleetApi: Send + Sync {
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

/// reqwest-backed [`FleetApi`]
#[derive(Clone)]
pub struct HttpFleetApi {
    base_url: String,
    client: Client,
}

impl HttpFleetApi {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ClientError::configuration("fleet service base URL is empty"));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ClientError::configuration(format!(
                "fleet service base URL must start with http:// or https://, got '{trimmed}'"
            )));
        }

        let client = Client::builder().build().map_err(|error| {
            ClientError::configuration(format!("failed to build HTTP client: {error}"))
        })?;

        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_owned(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        let suffix = path.trim_start_matches('/');
        format!("{}/{suffix}", self.base_url)
    }

    async fn request_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request
            .send()
            .await
            .map_err(|error| ClientError::transport(format!("request failed: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| ClientError::transport(format!("response read failed: {error}")))?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|error| ClientError::decode(error.to_string()))
    }

    async fn request_status_only(&self, request: RequestBuilder) -> ClientResult<()> {
        let response = request
            .send()
            .await
            .map_err(|error| ClientError::transport(format!("request failed: {error}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        debug!("GET {}", path);
        self.request_json(self.client.get(self.endpoint(path))).await
    }

    async fn post_empty(&self, path: &str) -> ClientResult<()> {
        debug!("POST {}", path);
        self.request_status_only(self.client.post(self.endpoint(path)))
            .await
    }
}

#[async_trait]
impl FleetApi for HttpFleetApi {
    async fn fetch_drones(&self) -> ClientResult<Vec<Drone>> {
        self.get(DRONES_PATH).await
    }

    async fn fetch_orders(&self) -> ClientResult<Vec<Order>> {
        self.get(ORDERS_PATH).await
    }

    async fn fetch_metrics(&self) -> ClientResult<MetricsSnapshot> {
        self.get(METRICS_PATH).await
    }

    async fn create_order(&self, order: &NewOrder) -> ClientResult<()> {
        debug!("POST {} for customer {}", ORDERS_PATH, order.customer_name);
        let request = self.client.post(self.endpoint(ORDERS_PATH)).json(order);
        self.request_status_only(request).await
    }

    async fn create_drone(&self, drone: &NewDrone) -> ClientResult<()> {
        debug!("POST {} for drone {}", DRONES_PATH, drone.name);
        let request = self.client.post(self.endpoint(DRONES_PATH)).json(drone);
        self.request_status_only(request).await
    }

    async fn allocate_orders(&self) -> ClientResult<()> {
        self.post_empty(ALLOCATE_PATH).await
    }

    async fn generate_random_order(&self) -> ClientResult<()> {
        self.post_empty(GENERATE_ORDER_PATH).await
    }

    async fn start_simulation(&self) -> ClientResult<()> {
        self.post_empty(START_SIMULATION_PATH).await
    }

    async fn reset_simulation(&self) -> ClientResult<()> {
        self.post_empty(RESET_SIMULATION_PATH).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

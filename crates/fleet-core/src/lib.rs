//! # Fleet Core
//!
//! Domain models for the drone-delivery fleet dashboard.
//! These are the wire shapes served by the fleet-management service and
//! shared by every other crate in the workspace.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub mod error;
pub mod events;

pub use error::{CoreError, CoreResult};
pub use events::*;

/// Battery level under which a drone counts as low on charge
pub const LOW_BATTERY_THRESHOLD: f64 = 30.0;

/// Bounds of the order weight accepted by the operator form (kg)
pub const MIN_ORDER_WEIGHT: f64 = 0.1;
pub const MAX_ORDER_WEIGHT: f64 = 10.0;

/// The backend persists nullable numeric columns; treat `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn normalize_token(raw: &str) -> String {
    raw.trim().to_ascii_uppercase().replace('-', "_")
}

// ============================================================================
// DRONE MODELS
// ============================================================================

/// Unique identifier for a drone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DroneId(pub String);

impl DroneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DroneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DroneId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DroneId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Operational status of a delivery drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneStatus {
    /// Parked at base, available
    Idle,
    /// Taking on cargo
    Loading,
    /// En route to a destination
    Flying,
    /// Dropping off cargo
    Delivering,
    /// Flying back to base
    Returning,
    /// Recharging at base
    Charging,
    /// Out of service
    Maintenance,
}

impl DroneStatus {
    /// Every status, in declaration order
    pub const ALL: [DroneStatus; 7] = [
        DroneStatus::Idle,
        DroneStatus::Loading,
        DroneStatus::Flying,
        DroneStatus::Delivering,
        DroneStatus::Returning,
        DroneStatus::Charging,
        DroneStatus::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DroneStatus::Idle => "IDLE",
            DroneStatus::Loading => "LOADING",
            DroneStatus::Flying => "FLYING",
            DroneStatus::Delivering => "DELIVERING",
            DroneStatus::Returning => "RETURNING",
            DroneStatus::Charging => "CHARGING",
            DroneStatus::Maintenance => "MAINTENANCE",
        }
    }

    /// Loading, flying or delivering
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            DroneStatus::Flying | DroneStatus::Delivering | DroneStatus::Loading
        )
    }

    /// Idle or charging
    pub fn is_at_base(&self) -> bool {
        matches!(self, DroneStatus::Idle | DroneStatus::Charging)
    }
}

impl fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for DroneStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl FromStr for DroneStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s);
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == token)
            .ok_or_else(|| CoreError::unknown_value("drone status", s))
    }
}

/// Coarse battery classification used by the fleet table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatteryBand {
    Good,
    Warning,
    Critical,
}

impl BatteryBand {
    pub fn from_level(level: f64) -> Self {
        if level > 70.0 {
            BatteryBand::Good
        } else if level > 30.0 {
            BatteryBand::Warning
        } else {
            BatteryBand::Critical
        }
    }
}

/// Planar coordinates on the delivery grid
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// A delivery drone as reported by the fleet service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drone {
    pub id: DroneId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Maximum payload in kg
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_weight: f64,
    /// Maximum range in km
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_distance: f64,
    /// Battery level percentage (0-100)
    #[serde(rename = "currentBattery", default, deserialize_with = "null_as_default")]
    pub battery_level: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: DroneStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_x: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_y: f64,
    #[serde(default)]
    pub last_update: Option<NaiveDateTime>,
}

impl Drone {
    pub fn new(id: impl Into<DroneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_weight: 0.0,
            max_distance: 0.0,
            battery_level: 100.0,
            status: DroneStatus::default(),
            current_x: 0.0,
            current_y: 0.0,
            last_update: None,
        }
    }

    pub fn with_status(mut self, status: DroneStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_battery(mut self, level: f64) -> Self {
        self.battery_level = level;
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.current_x, self.current_y)
    }

    pub fn is_low_battery(&self) -> bool {
        self.battery_level < LOW_BATTERY_THRESHOLD
    }

    pub fn battery_band(&self) -> BatteryBand {
        BatteryBand::from_level(self.battery_level)
    }
}

// ============================================================================
// ORDER MODELS
// ============================================================================

/// Unique identifier for an order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Delivery priority. Declaration order is the tie-break order: `Low < Urgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Highest priority first
    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s);
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == token)
            .ok_or_else(|| CoreError::unknown_value("priority", s))
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Assigned,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::InTransit => "IN_TRANSIT",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s);
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == token)
            .ok_or_else(|| CoreError::unknown_value("order status", s))
    }
}

/// A delivery order as reported by the fleet service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_x: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_y: f64,
    /// Payload weight in kg
    #[serde(default, deserialize_with = "null_as_default")]
    pub weight: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub scheduled_for: Option<NaiveDateTime>,
    #[serde(default)]
    pub delivered_at: Option<NaiveDateTime>,
    /// Weak reference to the carrying drone; never resolved locally
    #[serde(default, alias = "assignedDrone")]
    pub assigned_drone_id: Option<DroneId>,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, customer_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            customer_name: customer_name.into(),
            location_x: 0.0,
            location_y: 0.0,
            weight: 1.0,
            priority: Priority::default(),
            status: OrderStatus::default(),
            created_at: None,
            scheduled_for: None,
            delivered_at: None,
            assigned_drone_id: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn destination(&self) -> Position {
        Position::new(self.location_x, self.location_y)
    }

    /// Case-insensitive substring match against customer name or id.
    /// `needle` must already be lowercase; an empty needle matches everything.
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.customer_name.to_lowercase().contains(needle)
            || self.id.as_str().to_lowercase().contains(needle)
    }

    /// Orders still waiting on the map: pending or assigned
    pub fn is_map_visible(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Assigned)
    }
}

// ============================================================================
// METRICS SNAPSHOT
// ============================================================================

/// Aggregate metrics as served by the fleet service.
///
/// The payload is opaque; well-known keys get typed accessors and everything
/// else is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsSnapshot(pub Map<String, Value>);

impl MetricsSnapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn count(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    pub fn total_drones(&self) -> Option<u64> {
        self.count("totalDrones")
    }

    pub fn idle_drones(&self) -> Option<u64> {
        self.count("idleDrones")
    }

    pub fn active_drones(&self) -> Option<u64> {
        self.count("activeDrones")
    }

    pub fn charging_drones(&self) -> Option<u64> {
        self.count("chargingDrones")
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.0.get("timestamp").and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// COMMAND PAYLOADS
// ============================================================================

/// Body of `POST /api/orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    pub location_x: f64,
    pub location_y: f64,
    pub weight: f64,
    pub priority: Priority,
}

/// Body of `POST /api/drones`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDrone {
    pub name: String,
    pub max_weight: f64,
    pub max_distance: f64,
    pub battery_capacity: f64,
    pub status: DroneStatus,
}

impl NewDrone {
    /// New drones always start idle with a full battery
    pub fn new(name: impl Into<String>, max_weight: f64, max_distance: f64) -> Self {
        Self {
            name: name.into(),
            max_weight,
            max_distance,
            battery_capacity: 100.0,
            status: DroneStatus::Idle,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

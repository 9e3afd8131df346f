//! Event types for the fleet dashboard
//!
//! These events flow from the synchronization engine to the operator
//! surface: refresh progress, fetch failures, command outcomes and
//! connection changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// One of the three remote collections mirrored locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Drones,
    Orders,
    Metrics,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Drones, Resource::Orders, Resource::Metrics];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Drones => "drones",
            Resource::Orders => "orders",
            Resource::Metrics => "metrics",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drones" | "drone" | "fleet" => Ok(Resource::Drones),
            "orders" | "order" => Ok(Resource::Orders),
            "metrics" => Ok(Resource::Metrics),
            _ => Err(CoreError::UnknownResource(s.to_string())),
        }
    }
}

/// Backend link indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "CONNECTING"),
            ConnectionState::Connected => write!(f, "CONNECTED"),
            ConnectionState::Disconnected => write!(f, "DISCONNECTED"),
        }
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Connecting
    }
}

/// Control operations the operator can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    AllocateOrders,
    GenerateRandomOrder,
    StartSimulation,
    ResetSimulation,
    CreateOrder,
    CreateDrone,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::AllocateOrders => "allocate_orders",
            CommandKind::GenerateRandomOrder => "generate_random_order",
            CommandKind::StartSimulation => "start_simulation",
            CommandKind::ResetSimulation => "reset_simulation",
            CommandKind::CreateOrder => "create_order",
            CommandKind::CreateDrone => "create_drone",
        }
    }

    /// Operator-facing confirmation text
    pub fn success_message(&self) -> &'static str {
        match self {
            CommandKind::AllocateOrders => "Allocation done, drones are being loaded",
            CommandKind::GenerateRandomOrder => "Random order generated",
            CommandKind::StartSimulation => "Simulation started",
            CommandKind::ResetSimulation => "Simulation reset",
            CommandKind::CreateOrder => "Order created",
            CommandKind::CreateDrone => "Drone created",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    pub timestamp: DateTime<Utc>,
    pub payload: SyncEventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEventPayload {
    RefreshStarted {
        generation: u64,
    },
    RefreshCompleted {
        generation: u64,
        failed: Vec<Resource>,
    },
    ResourceReplaced {
        resource: Resource,
        generation: u64,
        count: usize,
    },
    FetchFailed {
        resource: Resource,
        generation: u64,
        reason: String,
    },
    CommandSucceeded {
        command: CommandKind,
        message: String,
    },
    CommandFailed {
        command: CommandKind,
        reason: String,
    },
    ConnectionChanged {
        state: ConnectionState,
    },
}

impl SyncEvent {
    pub fn new(payload: SyncEventPayload) -> Self {
        Self {
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn refresh_started(generation: u64) -> Self {
        Self::new(SyncEventPayload::RefreshStarted { generation })
    }

    pub fn refresh_completed(generation: u64, failed: Vec<Resource>) -> Self {
        Self::new(SyncEventPayload::RefreshCompleted { generation, failed })
    }

    pub fn resource_replaced(resource: Resource, generation: u64, count: usize) -> Self {
        Self::new(SyncEventPayload::ResourceReplaced {
            resource,
            generation,
            count,
        })
    }

    pub fn fetch_failed(resource: Resource, generation: u64, reason: impl Into<String>) -> Self {
        Self::new(SyncEventPayload::FetchFailed {
            resource,
            generation,
            reason: reason.into(),
        })
    }

    pub fn command_succeeded(command: CommandKind) -> Self {
        Self::new(SyncEventPayload::CommandSucceeded {
            command,
            message: command.success_message().to_string(),
        })
    }

    pub fn command_failed(command: CommandKind, reason: impl Into<String>) -> Self {
        Self::new(SyncEventPayload::CommandFailed {
            command,
            reason: reason.into(),
        })
    }

    pub fn connection_changed(state: ConnectionState) -> Self {
        Self::new(SyncEventPayload::ConnectionChanged { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_parsing() {
        assert_eq!("Orders".parse::<Resource>().unwrap(), Resource::Orders);
        assert_eq!("fleet".parse::<Resource>().unwrap(), Resource::Drones);
        assert!("missions".parse::<Resource>().is_err());
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = SyncEvent::fetch_failed(Resource::Orders, 3, "connection refused");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["payload"]["type"], "fetch_failed");
        assert_eq!(json["payload"]["resource"], "orders");
    }

    #[test]
    fn test_command_success_carries_message() {
        let event = SyncEvent::command_succeeded(CommandKind::StartSimulation);
        match event.payload {
            SyncEventPayload::CommandSucceeded { command, message } => {
                assert_eq!(command, CommandKind::StartSimulation);
                assert_eq!(message, "Simulation started");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}

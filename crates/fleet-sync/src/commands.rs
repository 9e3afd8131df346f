//! Command dispatch: control operations followed by a forced resync

use crate::error::{CommandError, CommandResult};
use crate::events::EventBus;
use crate::scheduler::{FetchScheduler, RefreshReport};
use fleet_client::FleetApi;
use fleet_core::{
    CommandKind, CoreError, MAX_ORDER_WEIGHT, MIN_ORDER_WEIGHT, NewDrone, NewOrder, Priority,
    SyncEvent,
};
use fleet_telemetry::{Outcome, SyncMetrics};

use std::sync::Arc;
use tracing::{error, info};

/// Proof that the operator confirmed a destructive reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetConfirmation(());

impl ResetConfirmation {
    /// Only an explicit `yes` confirms
    pub fn from_reply(reply: &str) -> CommandResult<Self> {
        if reply.trim().eq_ignore_ascii_case("yes") {
            Ok(Self(()))
        } else {
            Err(CommandError::ConfirmationRequired)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AllocateOrders,
    GenerateRandomOrder,
    StartSimulation,
    ResetSimulation(ResetConfirmation),
    CreateOrder(NewOrder),
    CreateDrone(NewDrone),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::AllocateOrders => CommandKind::AllocateOrders,
            Command::GenerateRandomOrder => CommandKind::GenerateRandomOrder,
            Command::StartSimulation => CommandKind::StartSimulation,
            Command::ResetSimulation(_) => CommandKind::ResetSimulation,
            Command::CreateOrder(_) => CommandKind::CreateOrder,
            Command::CreateDrone(_) => CommandKind::CreateDrone,
        }
    }
}

// ============================================================================
// FORMS
// ============================================================================

fn required<'a>(field: &'static str, value: &'a str) -> CommandResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CommandError::validation(field, "is required"));
    }
    Ok(value)
}

fn number(field: &'static str, value: &str) -> CommandResult<f64> {
    let raw = required(field, value)?;
    match raw.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(CommandError::validation(
            field,
            format!("'{}' is not a number", raw),
        )),
    }
}

/// Raw operator input for a new order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub customer_name: String,
    pub location_x: String,
    pub location_y: String,
    pub weight: String,
    /// Empty means MEDIUM
    pub priority: String,
}

impl OrderForm {
    pub fn validate(&self) -> CommandResult<NewOrder> {
        let customer_name = required("customer name", &self.customer_name)?.to_string();
        let location_x = number("location x", &self.location_x)?;
        let location_y = number("location y", &self.location_y)?;

        let weight = number("weight", &self.weight)?;
        if !(MIN_ORDER_WEIGHT..=MAX_ORDER_WEIGHT).contains(&weight) {
            return Err(CommandError::validation(
                "weight",
                format!("must be between {} and {}", MIN_ORDER_WEIGHT, MAX_ORDER_WEIGHT),
            ));
        }

        let priority = match self.priority.trim() {
            "" => Priority::default(),
            raw => raw
                .parse::<Priority>()
                .map_err(|e: CoreError| CommandError::validation("priority", e.to_string()))?,
        };

        Ok(NewOrder {
            customer_name,
            location_x,
            location_y,
            weight,
            priority,
        })
    }
}

/// Raw operator input for a new drone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DroneForm {
    pub name: String,
    pub max_weight: String,
    pub max_distance: String,
}

impl DroneForm {
    pub fn validate(&self) -> CommandResult<NewDrone> {
        let name = required("name", &self.name)?;
        let max_weight = number("max weight", &self.max_weight)?;
        let max_distance = number("max distance", &self.max_distance)?;

        Ok(NewDrone::new(name, max_weight, max_distance))
    }
}

// ============================================================================
// DISPATCHER
// ============================================================================

/// Sends commands to the fleet service and resyncs after each success.
///
/// Failures are returned to the caller and published; nothing is retried and
/// no resync is forced.
pub struct CommandDispatcher {
    api: Arc<dyn FleetApi>,
    scheduler: Arc<FetchScheduler>,
    events: EventBus,
    metrics: Arc<SyncMetrics>,
}

impl CommandDispatcher {
    pub fn new(
        api: Arc<dyn FleetApi>,
        scheduler: Arc<FetchScheduler>,
        events: EventBus,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            api,
            scheduler,
            events,
            metrics,
        }
    }

    pub async fn dispatch(&self, command: Command) -> CommandResult<RefreshReport> {
        let kind = command.kind();
        info!("📨 Dispatching {}", kind);

        let result = match &command {
            Command::AllocateOrders => self.api.allocate_orders().await,
            Command::GenerateRandomOrder => self.api.generate_random_order().await,
            Command::StartSimulation => self.api.start_simulation().await,
            Command::ResetSimulation(_) => self.api.reset_simulation().await,
            Command::CreateOrder(order) => self.api.create_order(order).await,
            Command::CreateDrone(drone) => self.api.create_drone(drone).await,
        };

        match result {
            Ok(()) => {
                info!("✅ {}", kind.success_message());
                self.metrics.record_command(kind, Outcome::Success);
                self.events.publish(SyncEvent::command_succeeded(kind));
                Ok(self.scheduler.refresh_all().await)
            }
            Err(source) => {
                error!("❌ {} failed: {}", kind, source);
                self.metrics.record_command(kind, Outcome::Failure);
                self.events
                    .publish(SyncEvent::command_failed(kind, source.to_string()));
                Err(CommandError::Api {
                    command: kind,
                    source,
                })
            }
        }
    }

    pub async fn create_order(&self, form: &OrderForm) -> CommandResult<RefreshReport> {
        let order = form.validate()?;
        self.dispatch(Command::CreateOrder(order)).await
    }

    pub async fn create_drone(&self, form: &DroneForm) -> CommandResult<RefreshReport> {
        let drone = form.validate()?;
        self.dispatch(Command::CreateDrone(drone)).await
    }

    pub async fn allocate_orders(&self) -> CommandResult<RefreshReport> {
        self.dispatch(Command::AllocateOrders).await
    }

    pub async fn generate_random_order(&self) -> CommandResult<RefreshReport> {
        self.dispatch(Command::GenerateRandomOrder).await
    }

    pub async fn start_simulation(&self) -> CommandResult<RefreshReport> {
        self.dispatch(Command::StartSimulation).await
    }

    pub async fn reset_simulation(
        &self,
        confirmation: ResetConfirmation,
    ) -> CommandResult<RefreshReport> {
        self.dispatch(Command::ResetSimulation(confirmation)).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Line-oriented operator console.
//!
//! Reads one command per line, drives the sync engine and renders plain-text
//! views of the mirrored state. Rendering is kept deliberately minimal.

use crate::error::{ConsoleError, ConsoleResult};
use fleet_core::{BatteryBand, Drone, OrderStatus, Priority, Resource, SyncEvent, SyncEventPayload};
use fleet_sync::{CommandError, DroneForm, FleetSync, OrderForm, RefreshReport, ResetConfirmation};
use fleet_view::{
    FilterState, OrderPage, PageSlot, Selection, filter_orders, summarize, total_pages, view,
};
use std::fmt::Write;

pub const HELP: &str = "\
Views:     summary | drones | orders | stats
Refresh:   refresh [drones|orders|metrics]
Filters:   search [term...] | status <ALL|PENDING|...> | priority <ALL|URGENT|...> | clear
Pages:     page <n> | next | prev
Commands:  allocate | generate | start | reset
           order <x> <y> <weight> <priority> <customer...>
           drone <max-weight> <max-distance> <name...>
Other:     help | quit";

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Empty,
    Summary,
    Drones,
    Orders,
    Refresh(Option<Resource>),
    Search(String),
    Status(Selection<OrderStatus>),
    Priority(Selection<Priority>),
    Clear,
    Page(usize),
    Next,
    Prev,
    Allocate,
    Generate,
    Start,
    Reset,
    CreateOrder(OrderForm),
    CreateDrone(DroneForm),
    Stats,
    Help,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> ConsoleResult<Self> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(ConsoleCommand::Empty);
        };
        let mut rest = || words.next().unwrap_or_default().to_string();

        let command = match head.to_ascii_lowercase().as_str() {
            "summary" => ConsoleCommand::Summary,
            "drones" => ConsoleCommand::Drones,
            "orders" => ConsoleCommand::Orders,
            "refresh" | "r" => match rest().as_str() {
                "" => ConsoleCommand::Refresh(None),
                resource => ConsoleCommand::Refresh(Some(resource.parse()?)),
            },
            "search" => ConsoleCommand::Search(remainder(line, 1)),
            "status" => match rest().as_str() {
                "" => return Err(ConsoleError::missing("status", "a status or ALL")),
                value => ConsoleCommand::Status(value.parse()?),
            },
            "priority" => match rest().as_str() {
                "" => return Err(ConsoleError::missing("priority", "a priority or ALL")),
                value => ConsoleCommand::Priority(value.parse()?),
            },
            "clear" => ConsoleCommand::Clear,
            "page" => match rest().as_str() {
                "" => return Err(ConsoleError::missing("page", "a page number")),
                value => ConsoleCommand::Page(
                    value
                        .parse()
                        .map_err(|_| ConsoleError::invalid("page number", value))?,
                ),
            },
            "next" => ConsoleCommand::Next,
            "prev" => ConsoleCommand::Prev,
            "allocate" => ConsoleCommand::Allocate,
            "generate" => ConsoleCommand::Generate,
            "start" => ConsoleCommand::Start,
            "reset" => ConsoleCommand::Reset,
            "order" => ConsoleCommand::CreateOrder(OrderForm {
                location_x: rest(),
                location_y: rest(),
                weight: rest(),
                priority: rest(),
                customer_name: remainder(line, 5),
            }),
            "drone" => ConsoleCommand::CreateDrone(DroneForm {
                max_weight: rest(),
                max_distance: rest(),
                name: remainder(line, 3),
            }),
            "stats" => ConsoleCommand::Stats,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            other => return Err(ConsoleError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

/// Everything after the first `skip` words, whitespace-normalized
fn remainder(line: &str, skip: usize) -> String {
    line.split_whitespace()
        .skip(skip)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Work that talks to the fleet service. Runs off the input loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Refresh(Option<Resource>),
    Allocate,
    Generate,
    Start,
    Reset(ResetConfirmation),
    CreateOrder(OrderForm),
    CreateDrone(DroneForm),
}

impl Job {
    /// Run against the engine and describe the outcome for the operator
    pub async fn run(self, sync: &FleetSync) -> String {
        let dispatcher = sync.dispatcher();

        match self {
            Job::Refresh(None) => refresh_outcome(&sync.scheduler().refresh_all().await),
            Job::Refresh(Some(resource)) => {
                refresh_outcome(&sync.scheduler().refresh_resource(resource).await)
            }
            Job::Allocate => command_outcome(dispatcher.allocate_orders().await),
            Job::Generate => command_outcome(dispatcher.generate_random_order().await),
            Job::Start => command_outcome(dispatcher.start_simulation().await),
            Job::Reset(confirmation) => {
                command_outcome(dispatcher.reset_simulation(confirmation).await)
            }
            Job::CreateOrder(form) => command_outcome(dispatcher.create_order(&form).await),
            Job::CreateDrone(form) => command_outcome(dispatcher.create_drone(&form).await),
        }
    }
}

/// What the caller should do after a line was handled
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Output(String),
    Run(Job),
    Quit,
}

pub struct Console<'a> {
    sync: &'a FleetSync,
    filter: FilterState,
    awaiting_reset: bool,
}

impl<'a> Console<'a> {
    pub fn new(sync: &'a FleetSync) -> Self {
        Self {
            sync,
            filter: FilterState::new(),
            awaiting_reset: false,
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Local views and filter changes answer at once; service calls come
    /// back as a [`Job`] for the caller to run.
    pub fn handle_line(&mut self, line: &str) -> Reply {
        if self.awaiting_reset {
            self.awaiting_reset = false;
            return match ResetConfirmation::from_reply(line) {
                Ok(confirmation) => Reply::Run(Job::Reset(confirmation)),
                Err(_) => Reply::Output("Reset cancelled".to_string()),
            };
        }

        match ConsoleCommand::parse(line) {
            Ok(command) => self.execute(command),
            Err(e) => Reply::Output(e.to_string()),
        }
    }

    fn execute(&mut self, command: ConsoleCommand) -> Reply {
        let text = match command {
            ConsoleCommand::Quit => return Reply::Quit,
            ConsoleCommand::Refresh(resource) => return Reply::Run(Job::Refresh(resource)),
            ConsoleCommand::Allocate => return Reply::Run(Job::Allocate),
            ConsoleCommand::Generate => return Reply::Run(Job::Generate),
            ConsoleCommand::Start => return Reply::Run(Job::Start),
            ConsoleCommand::CreateOrder(form) => return Reply::Run(Job::CreateOrder(form)),
            ConsoleCommand::CreateDrone(form) => return Reply::Run(Job::CreateDrone(form)),
            ConsoleCommand::Empty => String::new(),
            ConsoleCommand::Summary => self.render_summary(),
            ConsoleCommand::Drones => render_drones(&self.sync.store().drones()),
            ConsoleCommand::Orders => self.render_orders(),
            ConsoleCommand::Search(term) => {
                self.filter.set_search_term(term);
                self.render_orders()
            }
            ConsoleCommand::Status(status) => {
                self.filter.set_status_filter(status);
                self.render_orders()
            }
            ConsoleCommand::Priority(priority) => {
                self.filter.set_priority_filter(priority);
                self.render_orders()
            }
            ConsoleCommand::Clear => {
                self.filter.clear_filters();
                self.render_orders()
            }
            ConsoleCommand::Page(page) => {
                let total = self.filtered_pages();
                if !self.filter.go_to_page(page, total) && page != self.filter.page() {
                    format!("No page {} (1-{})", page, total.max(1))
                } else {
                    self.render_orders()
                }
            }
            ConsoleCommand::Next => {
                let total = self.filtered_pages();
                self.filter.next_page(total);
                self.render_orders()
            }
            ConsoleCommand::Prev => {
                self.filter.prev_page();
                self.render_orders()
            }
            ConsoleCommand::Reset => {
                self.awaiting_reset = true;
                "This clears all drones and orders. Type 'yes' to confirm:".to_string()
            }
            ConsoleCommand::Stats => match self.sync.metrics().export() {
                Ok(text) => text,
                Err(e) => format!("Metrics unavailable: {}", e),
            },
            ConsoleCommand::Help => HELP.to_string(),
        };

        Reply::Output(text)
    }

    /// React to an engine notification; returns a line for the operator if any
    pub fn on_event(&mut self, event: &SyncEvent) -> Option<String> {
        match &event.payload {
            SyncEventPayload::ResourceReplaced {
                resource: Resource::Orders,
                ..
            } => {
                self.reanchor();
                None
            }
            SyncEventPayload::FetchFailed {
                resource, reason, ..
            } => Some(format!("⚠ Could not refresh {}: {}", resource, reason)),
            SyncEventPayload::CommandSucceeded { message, .. } => Some(format!("✓ {}", message)),
            SyncEventPayload::CommandFailed { command, reason } => {
                Some(format!("✗ {} failed: {}", command, reason))
            }
            SyncEventPayload::ConnectionChanged { state } => Some(format!("Connection: {}", state)),
            _ => None,
        }
    }

    /// Keep the stored page inside the range of the current filtered result
    fn reanchor(&mut self) {
        let total = self.filtered_pages();
        self.filter.clamp_to(total);
    }

    fn filtered_pages(&self) -> usize {
        let orders = self.sync.store().orders();
        total_pages(filter_orders(&orders, &self.filter).len())
    }

    fn render_summary(&self) -> String {
        let snapshot = self.sync.store().snapshot();
        let summary = summarize(&snapshot.drones, &snapshot.orders);
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Connection: {} | Loading: {}",
            self.sync.connection().state(),
            if self.sync.scheduler().is_loading() { "yes" } else { "no" }
        );
        let _ = writeln!(
            out,
            "Drones: {} total, {} active ({} flying, {} delivering), {} at base, {} low battery, avg battery {}%",
            summary.total_drones,
            summary.active_drones,
            summary.in_flight,
            summary.delivering,
            summary.at_base,
            summary.low_battery,
            summary.average_battery
        );
        let _ = writeln!(
            out,
            "Orders: {} total, {} pending, {} delivered, {} urgent, delivery rate {}%",
            summary.total_orders,
            summary.pending_orders,
            summary.delivered_orders,
            summary.urgent_orders,
            summary.delivery_rate
        );
        let _ = writeln!(out, "Drones by status: {}", histogram(&summary.drones_by_status));
        let _ = writeln!(out, "Orders by priority: {}", histogram(&summary.orders_by_priority));
        let _ = writeln!(out, "Orders by status: {}", histogram(&summary.orders_by_status));

        if !snapshot.metrics.is_empty() {
            let reported: Vec<String> = snapshot
                .metrics
                .0
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            let _ = writeln!(out, "Service metrics: {}", reported.join(", "));
        }

        for (resource, failure) in &snapshot.failures {
            let _ = writeln!(
                out,
                "Stale {}: last refresh failed at {} ({})",
                resource,
                failure.at.format("%H:%M:%S"),
                failure.reason
            );
        }

        out.trim_end().to_string()
    }

    fn render_orders(&self) -> String {
        let orders = self.sync.store().orders();
        render_page(&view(&orders, &self.filter), &self.filter)
    }
}

fn histogram<T: std::fmt::Display>(counts: &[(T, usize)]) -> String {
    counts
        .iter()
        .map(|(key, count)| format!("{} {}", key, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn battery_marker(band: BatteryBand) -> &'static str {
    match band {
        BatteryBand::Good => "ok",
        BatteryBand::Warning => "warn",
        BatteryBand::Critical => "CRIT",
    }
}

pub fn render_drones(drones: &[Drone]) -> String {
    if drones.is_empty() {
        return "No drones registered".to_string();
    }

    let mut out = String::new();
    for drone in drones {
        let _ = writeln!(
            out,
            "{:<10} {:<16} {:<11} {:>5.1}% {:<4} at {}",
            drone.id.as_str(),
            drone.name,
            drone.status.as_str(),
            drone.battery_level,
            battery_marker(drone.battery_band()),
            drone.position()
        );
    }
    out.trim_end().to_string()
}

pub fn render_page(page: &OrderPage<'_>, filter: &FilterState) -> String {
    let mut out = String::new();

    let mut active = Vec::new();
    if !filter.search_term().is_empty() {
        active.push(format!("search '{}'", filter.search_term()));
    }
    if !filter.status_filter().is_all() {
        active.push(format!("status {}", filter.status_filter()));
    }
    if !filter.priority_filter().is_all() {
        active.push(format!("priority {}", filter.priority_filter()));
    }
    if !active.is_empty() {
        let _ = writeln!(out, "Filters: {}", active.join(", "));
    }

    if let Some(reason) = page.empty {
        let _ = write!(out, "{}", reason.message());
        return out;
    }

    for order in &page.items {
        let _ = writeln!(
            out,
            "{:<10} {:<20} {:<7} {:<10} {:>5.1}kg to {}",
            order.id.as_str(),
            order.customer_name,
            order.priority.as_str(),
            order.status.as_str(),
            order.weight,
            order.destination()
        );
    }

    if let Some((start, end)) = page.range {
        let _ = writeln!(
            out,
            "Showing {}-{} of {} orders",
            start, end, page.total_count
        );
    }
    if page.show_controls() {
        let window: Vec<String> = page
            .window
            .iter()
            .map(|slot| match slot {
                PageSlot::Page(n) if *n == page.page => format!("[{}]", n),
                other => other.to_string(),
            })
            .collect();
        let _ = write!(
            out,
            "{} {} {}",
            if page.has_prev { "«" } else { " " },
            window.join(" "),
            if page.has_next { "»" } else { " " }
        );
    }

    out.trim_end().to_string()
}

fn refresh_outcome(report: &RefreshReport) -> String {
    if report.is_complete() {
        return format!("Refreshed (cycle {})", report.generation);
    }
    let failed: Vec<&str> = report.failed.iter().map(|r| r.as_str()).collect();
    format!(
        "Refreshed (cycle {}), kept previous {}",
        report.generation,
        failed.join(", ")
    )
}

fn command_outcome(result: Result<RefreshReport, CommandError>) -> String {
    match result {
        Ok(report) => refresh_outcome(&report),
        Err(e) => format!("Error: {}", e),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fleet_client::{ClientError, ClientResult, FleetApi};
    use fleet_core::{DroneStatus, MetricsSnapshot, NewDrone, NewOrder, Order};
    use fleet_sync::SyncConfig;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 23 orders, every fifth one URGENT; one drone per status
    #[derive(Default)]
    struct CannedApi {
        orders: AtomicUsize,
        resets: AtomicUsize,
    }

    impl CannedApi {
        fn with_orders(count: usize) -> Arc<Self> {
            Arc::new(Self {
                orders: AtomicUsize::new(count),
                resets: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl FleetApi for CannedApi {
        async fn fetch_drones(&self) -> ClientResult<Vec<Drone>> {
            Ok(DroneStatus::ALL
                .iter()
                .enumerate()
                .map(|(i, status)| {
                    Drone::new(format!("d-{}", i), format!("Drone {}", i))
                        .with_status(*status)
                        .with_battery(20.0 + i as f64 * 10.0)
                })
                .collect())
        }

        async fn fetch_orders(&self) -> ClientResult<Vec<Order>> {
            let count = self.orders.load(Ordering::SeqCst);
            Ok((0..count)
                .map(|i| {
                    let order = Order::new(format!("o-{:02}", i), format!("Customer {}", i));
                    if i % 5 == 0 {
                        order.with_priority(Priority::Urgent)
                    } else {
                        order
                    }
                })
                .collect())
        }

        async fn fetch_metrics(&self) -> ClientResult<MetricsSnapshot> {
            Ok(MetricsSnapshot::default())
        }

        async fn create_order(&self, _order: &NewOrder) -> ClientResult<()> {
            Ok(())
        }

        async fn create_drone(&self, _drone: &NewDrone) -> ClientResult<()> {
            Ok(())
        }

        async fn allocate_orders(&self) -> ClientResult<()> {
            Err(ClientError::Status {
                status: 409,
                body: "no idle drones".into(),
            })
        }

        async fn generate_random_order(&self) -> ClientResult<()> {
            Ok(())
        }

        async fn start_simulation(&self) -> ClientResult<()> {
            Ok(())
        }

        async fn reset_simulation(&self) -> ClientResult<()> {
            self.resets.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn engine(api: Arc<CannedApi>) -> FleetSync {
        FleetSync::new(SyncConfig::default(), api).unwrap()
    }

    /// Handle a line and run any resulting job to completion
    async fn respond(console: &mut Console<'_>, sync: &FleetSync, line: &str) -> Reply {
        match console.handle_line(line) {
            Reply::Run(job) => Reply::Output(job.run(sync).await),
            reply => reply,
        }
    }

    fn output(reply: Reply) -> String {
        match reply {
            Reply::Output(text) => text,
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("   ").unwrap(), ConsoleCommand::Empty);
        assert_eq!(
            ConsoleCommand::parse("refresh orders").unwrap(),
            ConsoleCommand::Refresh(Some(Resource::Orders))
        );
        assert_eq!(
            ConsoleCommand::parse("search  maria   silva").unwrap(),
            ConsoleCommand::Search("maria silva".into())
        );
        assert_eq!(
            ConsoleCommand::parse("priority all").unwrap(),
            ConsoleCommand::Priority(Selection::All)
        );
        assert_eq!(
            ConsoleCommand::parse("status in-transit").unwrap(),
            ConsoleCommand::Status(Selection::Only(OrderStatus::InTransit))
        );
        assert_eq!(
            ConsoleCommand::parse("order 1 2 3.5 high Ana Souza").unwrap(),
            ConsoleCommand::CreateOrder(OrderForm {
                customer_name: "Ana Souza".into(),
                location_x: "1".into(),
                location_y: "2".into(),
                weight: "3.5".into(),
                priority: "high".into(),
            })
        );
        assert_eq!(
            ConsoleCommand::parse("drone 5 20 Sky Hawk").unwrap(),
            ConsoleCommand::CreateDrone(DroneForm {
                name: "Sky Hawk".into(),
                max_weight: "5".into(),
                max_distance: "20".into(),
            })
        );
        assert_eq!(ConsoleCommand::parse("Q").unwrap(), ConsoleCommand::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ConsoleCommand::parse("launch"),
            Err(ConsoleError::UnknownCommand(_))
        ));
        assert!(matches!(
            ConsoleCommand::parse("page two"),
            Err(ConsoleError::InvalidArgument { .. })
        ));
        assert!(matches!(
            ConsoleCommand::parse("status"),
            Err(ConsoleError::MissingArgument { .. })
        ));
        assert!(matches!(
            ConsoleCommand::parse("priority asap"),
            Err(ConsoleError::Core(_))
        ));
    }

    #[test]
    fn test_service_calls_are_returned_as_jobs() {
        let sync = engine(CannedApi::with_orders(0));
        let mut console = Console::new(&sync);

        assert_eq!(console.handle_line("allocate"), Reply::Run(Job::Allocate));
        assert_eq!(
            console.handle_line("refresh metrics"),
            Reply::Run(Job::Refresh(Some(Resource::Metrics)))
        );
        assert!(matches!(console.handle_line("reset"), Reply::Output(_)));
        assert!(matches!(console.handle_line("YES"), Reply::Run(Job::Reset(_))));
        assert!(matches!(console.handle_line("orders"), Reply::Output(_)));
    }

    #[tokio::test]
    async fn test_urgent_filter_shows_single_page() {
        let sync = engine(CannedApi::with_orders(23));
        sync.scheduler().refresh_all().await;
        let mut console = Console::new(&sync);

        let text = output(respond(&mut console, &sync, "priority urgent").await);
        assert!(text.contains("Filters: priority URGENT"));
        assert!(text.contains("Showing 1-5 of 5 orders"));
        assert!(text.contains("[1]"));
        assert!(!text.contains('»'));
    }

    #[tokio::test]
    async fn test_paging_and_filter_reset() {
        let sync = engine(CannedApi::with_orders(23));
        sync.scheduler().refresh_all().await;
        let mut console = Console::new(&sync);

        respond(&mut console, &sync, "next").await;
        respond(&mut console, &sync, "next").await;
        let text = output(respond(&mut console, &sync, "next").await);
        assert_eq!(console.filter().page(), 3);
        assert!(text.contains("Showing 21-23 of 23 orders"));

        let text = output(respond(&mut console, &sync, "page 9").await);
        assert_eq!(text, "No page 9 (1-3)");

        respond(&mut console, &sync, "search customer 2").await;
        assert_eq!(console.filter().page(), 1);
    }

    #[tokio::test]
    async fn test_page_is_reanchored_when_orders_shrink() {
        let api = CannedApi::with_orders(23);
        let sync = engine(Arc::clone(&api));
        let mut events = sync.events().subscribe();
        sync.scheduler().refresh_all().await;

        let mut console = Console::new(&sync);
        respond(&mut console, &sync, "page 3").await;
        assert_eq!(console.filter().page(), 3);

        api.orders.store(4, Ordering::SeqCst);
        sync.scheduler().refresh_resource(Resource::Orders).await;
        while let Ok(event) = events.try_recv() {
            console.on_event(&event);
        }

        assert_eq!(console.filter().page(), 1);
    }

    #[tokio::test]
    async fn test_empty_states() {
        let sync = engine(CannedApi::with_orders(0));
        sync.scheduler().refresh_all().await;
        let mut console = Console::new(&sync);

        assert_eq!(output(respond(&mut console, &sync, "orders").await), "No orders found");

        let sync = engine(CannedApi::with_orders(3));
        sync.scheduler().refresh_all().await;
        let mut console = Console::new(&sync);
        let text = output(respond(&mut console, &sync, "status delivered").await);
        assert!(text.ends_with("No orders match the active filters"));
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation() {
        let api = CannedApi::with_orders(0);
        let sync = engine(Arc::clone(&api));
        let mut console = Console::new(&sync);

        let prompt = output(respond(&mut console, &sync, "reset").await);
        assert!(prompt.contains("Type 'yes'"));
        assert_eq!(output(respond(&mut console, &sync, "no").await), "Reset cancelled");
        assert_eq!(api.resets.load(Ordering::SeqCst), 0);

        respond(&mut console, &sync, "reset").await;
        let text = output(respond(&mut console, &sync, "yes").await);
        assert!(text.starts_with("Refreshed"));
        assert_eq!(api.resets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_command_failure_is_reported() {
        let sync = engine(CannedApi::with_orders(0));
        let mut console = Console::new(&sync);

        let text = output(respond(&mut console, &sync, "allocate").await);
        assert!(text.starts_with("Error: allocate_orders failed"));
        assert!(text.contains("no idle drones"));

        let text = output(respond(&mut console, &sync, "order 1 2 25 low Ana").await);
        assert!(text.contains("weight"));
    }

    #[tokio::test]
    async fn test_summary_and_drones() {
        let sync = engine(CannedApi::with_orders(10));
        sync.scheduler().refresh_all().await;
        let mut console = Console::new(&sync);

        let summary = output(respond(&mut console, &sync, "summary").await);
        assert!(summary.contains("Drones: 7 total, 3 active (1 flying, 1 delivering), 2 at base"));
        assert!(summary.contains(
            "Orders: 10 total, 10 pending, 0 delivered, 2 urgent, delivery rate 0%"
        ));
        assert!(summary.contains("Orders by priority: URGENT 2, HIGH 0, MEDIUM 8, LOW 0"));

        let drones = output(respond(&mut console, &sync, "drones").await);
        assert_eq!(drones.lines().count(), 7);
        assert!(drones.contains("CRIT"));

        assert_eq!(respond(&mut console, &sync, "quit").await, Reply::Quit);
    }

    #[test]
    fn test_notifications() {
        let sync = engine(CannedApi::with_orders(0));
        let mut console = Console::new(&sync);

        let failed = SyncEvent::fetch_failed(Resource::Drones, 2, "connection refused");
        let line = console.on_event(&failed);
        assert_eq!(line.as_deref(), Some("⚠ Could not refresh drones: connection refused"));
        assert!(console.on_event(&SyncEvent::refresh_started(3)).is_none());
    }
}

//! # Fleet Telemetry - Sync Engine Metrics
//!
//! Prometheus metrics for the dashboard's synchronization engine:
//! - Fetches per resource and outcome
//! - Refresh cycles and their duration
//! - Command dispatch outcomes
//! - Local store sizes and the connection indicator

use fleet_core::{CommandKind, ConnectionState, Resource};
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use tracing::info;

/// Outcome label for fetches and commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    /// Response arrived after a newer one had already been applied
    Discarded,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Discarded => "discarded",
        }
    }
}

/// Metrics collector for the synchronization engine
pub struct SyncMetrics {
    registry: Registry,

    // Fetch metrics
    fetches_total: IntCounterVec,

    // Refresh metrics
    refresh_cycles: IntCounter,
    refresh_duration: Histogram,
    refreshes_in_flight: IntGauge,

    // Command metrics
    commands_total: IntCounterVec,

    // Store metrics
    store_items: IntGaugeVec,
    connection_state: IntGauge,
}

impl SyncMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let fetches_total = IntCounterVec::new(
            Opts::new("fleet_dashboard_fetches_total", "Resource fetches by outcome"),
            &["resource", "outcome"],
        )?;
        registry.register(Box::new(fetches_total.clone()))?;

        let refresh_cycles = IntCounter::new(
            "fleet_dashboard_refresh_cycles_total",
            "Completed refresh cycles",
        )?;
        registry.register(Box::new(refresh_cycles.clone()))?;

        let refresh_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fleet_dashboard_refresh_duration_seconds",
                "Wall time of one refresh cycle",
            )
            .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(refresh_duration.clone()))?;

        let refreshes_in_flight = IntGauge::new(
            "fleet_dashboard_refreshes_in_flight",
            "Refresh cycles currently running",
        )?;
        registry.register(Box::new(refreshes_in_flight.clone()))?;

        let commands_total = IntCounterVec::new(
            Opts::new("fleet_dashboard_commands_total", "Dispatched commands by outcome"),
            &["command", "outcome"],
        )?;
        registry.register(Box::new(commands_total.clone()))?;

        let store_items = IntGaugeVec::new(
            Opts::new("fleet_dashboard_store_items", "Items held per local collection"),
            &["resource"],
        )?;
        registry.register(Box::new(store_items.clone()))?;

        let connection_state = IntGauge::new(
            "fleet_dashboard_connected",
            "1 when the backend link is reported connected",
        )?;
        registry.register(Box::new(connection_state.clone()))?;

        info!("📊 Sync metrics initialized");

        Ok(Self {
            registry,
            fetches_total,
            refresh_cycles,
            refresh_duration,
            refreshes_in_flight,
            commands_total,
            store_items,
            connection_state,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> prometheus::Result<String> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    // ========================================================================
    // FETCH METRICS
    // ========================================================================

    pub fn record_fetch(&self, resource: Resource, outcome: Outcome) {
        self.fetches_total
            .with_label_values(&[resource.as_str(), outcome.as_str()])
            .inc();
    }

    // ========================================================================
    // REFRESH METRICS
    // ========================================================================

    pub fn refresh_started(&self) {
        self.refreshes_in_flight.inc();
    }

    pub fn refresh_finished(&self, duration_secs: f64) {
        self.refreshes_in_flight.dec();
        self.refresh_cycles.inc();
        self.refresh_duration.observe(duration_secs);
    }

    // ========================================================================
    // COMMAND METRICS
    // ========================================================================

    pub fn record_command(&self, command: CommandKind, outcome: Outcome) {
        self.commands_total
            .with_label_values(&[command.as_str(), outcome.as_str()])
            .inc();
    }

    // ========================================================================
    // STORE METRICS
    // ========================================================================

    pub fn set_store_items(&self, resource: Resource, count: usize) {
        self.store_items
            .with_label_values(&[resource.as_str()])
            .set(count as i64);
    }

    pub fn set_connection_state(&self, state: ConnectionState) {
        self.connection_state
            .set(if state == ConnectionState::Connected { 1 } else { 0 });
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = SyncMetrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_metrics_export() {
        let metrics = SyncMetrics::new().unwrap();

        metrics.record_fetch(Resource::Orders, Outcome::Failure);
        metrics.record_command(CommandKind::AllocateOrders, Outcome::Success);
        metrics.set_store_items(Resource::Drones, 12);
        metrics.set_connection_state(ConnectionState::Connected);

        let export = metrics.export().unwrap();
        assert!(export.contains("fleet_dashboard_fetches_total"));
        assert!(export.contains(r#"resource="orders""#));
        assert!(export.contains(r#"command="allocate_orders""#));
        assert!(export.contains("fleet_dashboard_connected 1"));
    }

    #[test]
    fn test_refresh_gauge_tracks_in_flight_cycles() {
        let metrics = SyncMetrics::new().unwrap();

        metrics.refresh_started();
        metrics.refresh_started();
        metrics.refresh_finished(0.2);

        let export = metrics.export().unwrap();
        assert!(export.contains("fleet_dashboard_refreshes_in_flight 1"));
        assert!(export.contains("fleet_dashboard_refresh_cycles_total 1"));
    }
}

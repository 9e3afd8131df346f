//! # Fleet Dashboard
//!
//! Operator console for the drone-delivery fleet. Mirrors the fleet
//! service's drones, orders and metrics, and forwards control commands.

mod config;
mod console;
mod error;
mod session;

use crate::config::{DashboardConfig, LogFormat};
use crate::session::run_session;

use fleet_client::HttpFleetApi;
use fleet_sync::FleetSync;

use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env()?;
    init_logging(config.log_format);

    // One thread: fetches and commands interleave only at await points
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(config));

    // The stdin reader can still be parked in a blocking read
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

async fn run(config: DashboardConfig) -> anyhow::Result<()> {
    info!("🚁 Starting Fleet Dashboard v{}", env!("CARGO_PKG_VERSION"));
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("   Fleet service: {}", config.api_base_url);
    info!("   Poll interval: {:?}", config.poll_interval);
    info!("   Reconciliation: {}", config.reconcile_policy);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let api = Arc::new(HttpFleetApi::new(config.api_base_url.clone())?);
    let sync = Arc::new(FleetSync::new(config.sync_config(), api)?);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let poller = sync.start(async move {
        let _ = stop_rx.await;
    });

    run_session(
        Arc::clone(&sync),
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        shutdown_signal(),
    )
    .await?;

    let _ = stop_tx.send(());
    poller.await?;

    info!("🛑 Dashboard stopped");
    Ok(())
}

/// Initialize logging with tracing. Logs go to stderr so they never
/// interleave with console output on stdout.
fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fleet_dashboard=debug,fleet_sync=debug"));

    let (pretty, json) = match format {
        LogFormat::Pretty => (
            Some(fmt::layer().with_target(true).with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down...");
        }
    }
}

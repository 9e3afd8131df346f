//! Dashboard configuration

use config::{Config, ConfigError, Environment};
use fleet_client::DEFAULT_BASE_URL;
use fleet_sync::{ReconcilePolicy, SyncConfig};
use serde::Deserialize;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Values as read from the environment, before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    api_base_url: String,
    poll_interval_ms: u64,
    handshake_delay_ms: u64,
    reconcile_policy: String,
    log_format: String,
}

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Fleet service location
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub handshake_delay: Duration,
    pub reconcile_policy: ReconcilePolicy,
    pub log_format: LogFormat,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(10),
            handshake_delay: Duration::from_millis(1500),
            reconcile_policy: ReconcilePolicy::LastWriteWins,
            log_format: LogFormat::Pretty,
        }
    }
}

impl DashboardConfig {
    /// Load from `DASHBOARD_*` environment variables, after an optional `.env`
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_environment(Environment::with_prefix("DASHBOARD"))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let raw: RawConfig = Config::builder()
            .set_default("api_base_url", DEFAULT_BASE_URL)?
            .set_default("poll_interval_ms", 10_000_i64)?
            .set_default("handshake_delay_ms", 1_500_i64)?
            .set_default("reconcile_policy", ReconcilePolicy::LastWriteWins.as_str())?
            .set_default("log_format", "pretty")?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;

        if raw.poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "DASHBOARD_POLL_INTERVAL_MS must be greater than 0".into(),
            ));
        }

        let reconcile_policy: ReconcilePolicy = raw
            .reconcile_policy
            .parse()
            .map_err(|e| ConfigError::Message(format!("DASHBOARD_RECONCILE_POLICY: {}", e)))?;

        let log_format = match raw.log_format.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::Message(format!(
                    "DASHBOARD_LOG_FORMAT: expected 'pretty' or 'json', got '{}'",
                    other
                )));
            }
        };

        Ok(Self {
            api_base_url: raw.api_base_url,
            poll_interval: Duration::from_millis(raw.poll_interval_ms),
            handshake_delay: Duration::from_millis(raw.handshake_delay_ms),
            reconcile_policy,
            log_format,
        })
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            poll_interval: self.poll_interval,
            handshake_delay: self.handshake_delay,
            reconcile_policy: self.reconcile_policy,
            ..SyncConfig::default()
        }
    }
}

/// Worker configuration
///
/// Read with the `config` crate from `WORKER_`-prefixed environment
/// variables, after loading `.env`:
///
/// - `WORKER_DATABASE_URL`: PostgreSQL connection string; falls back to
///   `DATABASE_URL` (one of them is required)
/// - `WORKER_MAX_CONNECTIONS`: pool size (default: 5)
/// - `WORKER_SCAN_INTERVAL_SECS`: seconds between overdue sweeps (default: 3600)
/// - `WORKER_LOG_JSON`: emit JSON logs (default: false)

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Worker settings
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,

    #[serde(default)]
    pub log_json: bool,
}

fn default_max_connections() -> u32 {
    5
}

fn default_scan_interval_secs() -> u64 {
    3600
}

impl WorkerConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(env::vars().collect())
    }

    /// Loads configuration from an explicit variable map
    pub fn from_vars(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(url) = vars.get("DATABASE_URL") {
            builder = builder.set_default("database_url", url.as_str())?;
        }

        let config: WorkerConfig = builder
            .add_source(config::Environment::with_prefix("WORKER").source(Some(vars)))
            .build()
            .context("Failed to read worker configuration")?
            .try_deserialize()
            .context("WORKER_DATABASE_URL or DATABASE_URL is required")?;

        if config.scan_interval_secs == 0 {
            anyhow::bail!("WORKER_SCAN_INTERVAL_SECS must be positive");
        }

        Ok(config)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

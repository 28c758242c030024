//! # TaskDesk Worker
//!
//! Runs the overdue sweep every `WORKER_SCAN_INTERVAL_SECS` until Ctrl-C.
//! With `--once`, runs a single sweep and exits.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskdesk-worker
//! cargo run -p taskdesk-worker -- --once
//! ```

use anyhow::Context;
use taskdesk_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use taskdesk_worker::{config::WorkerConfig, scheduler::OverdueScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskdesk_worker=debug,taskdesk_shared=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WorkerConfig::from_env()?;
    init_tracing(config.log_json);

    tracing::info!("TaskDesk Worker v{} starting...", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone()).max_connections(config.max_connections),
    )
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let scheduler = OverdueScheduler::new(pool.clone(), config.scan_interval());

    if std::env::args().any(|arg| arg == "--once") {
        let report = scheduler.tick().await?;
        tracing::info!(
            flagged = report.flagged,
            purged_tokens = report.purged_tokens,
            "Single sweep complete"
        );
    } else {
        let token = scheduler.shutdown_token();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown signal received, stopping scheduler..."),
                Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
            }
            token.cancel();
        });

        scheduler.run().await;
    }

    close_pool(pool).await;
    Ok(())
}

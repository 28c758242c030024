//! # TaskDesk API Server
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://... JWT_SECRET=... cargo run -p taskdesk-api
//! ```
//!
//! Migrations run on startup. See [`taskdesk_api::config`] for all
//! environment variables.

use std::net::SocketAddr;

use anyhow::Context;
use taskdesk_api::{
    app::{build_router, AppState},
    bootstrap,
    config::{Config, LogFormat},
};
use taskdesk_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskdesk_api=debug,api_activity=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log.format);

    tracing::info!("TaskDesk API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(
        DatabaseConfig::new(config.database.url.clone())
            .max_connections(config.database.max_connections),
    )
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap::ensure_admin(&pool, admin).await?;
    }

    let address = config.bind_address();
    let state = AppState::new(pool.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

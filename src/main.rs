use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod accuracy;
mod config;
mod dashboard;
mod db;
mod refresh;

use config::Config;
use dashboard::AppState;
use db::Database;
use refresh::{DataRefresher, LogOnlyRefresher, PipelineRefresher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    let refresher: Arc<dyn DataRefresher> = match &config.pipeline_url {
        Some(url) => {
            info!("Refresh requests go to pipeline at {}", url);
            Arc::new(PipelineRefresher::new(
                url,
                Duration::from_secs(config.pipeline_timeout_secs),
            )?)
        }
        None => {
            info!("No PIPELINE_URL configured – refresh requests will only be logged");
            Arc::new(LogOnlyRefresher)
        }
    };

    let state = AppState {
        db,
        refresher,
        sentiment_days: config.sentiment_days,
        upcoming_days: config.upcoming_days,
    };
    let app = dashboard::router(state);
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", config.listen_addr))?;
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

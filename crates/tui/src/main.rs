mod app;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use tokio::sync::mpsc;
use tracing_subscriber::{prelude::*, EnvFilter};

use realtyxr_core::{
    config::{self, AppConfig},
    ledger::{LedgerService, NetworkMonitor},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let ledger = LedgerService::seeded(config.latency);

    let monitor = NetworkMonitor::new(ledger.clone(), config.network_poll_secs);
    let (monitor_tx, monitor_rx) = mpsc::channel(8);
    tokio::spawn(async move {
        if let Err(err) = monitor.run(monitor_tx).await {
            tracing::error!("Network monitor task error: {err}");
        }
    });

    let mut app = app::RealtyApp::new(ledger, config);
    app.attach_monitor(monitor_rx);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("realtyxr.log");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}

//! linecastd - line-oriented text broadcast server.
//!
//! Every connected client's lines are relayed to all other clients, alongside
//! a handful of built-in commands and per-session metrics.

mod config;
mod error;
mod handlers;
mod http;
mod metrics;
mod network;
mod state;
mod storage;
mod telemetry;

use crate::config::Config;
use crate::handlers::Registry;
use crate::network::{Gateway, ServerContext, SessionSettings, UdpRelay};
use crate::state::Coordinator;
use crate::storage::CsvMetricsStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "linecast.toml".to_string());

    let config = Config::load_or_default(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.name,
        listen = %config.listen.address,
        "Starting linecastd"
    );

    let coordinator = Coordinator::spawn(config.limits.coordinator_queue);
    info!("Coordinator started");

    // Prometheus metrics are optional.
    // Convention: metrics_port = 0 disables the HTTP endpoint (used by tests).
    match config.server.metrics_address() {
        None => info!("Metrics disabled"),
        Some(addr) => {
            metrics::init();
            tokio::spawn(http::run_http_server(addr, coordinator.clone()));
        }
    }

    let ctx = ServerContext {
        coordinator,
        registry: Arc::new(Registry::new()),
        metrics_store: Arc::new(CsvMetricsStore::new(&config.storage.metrics_file)),
        settings: Arc::new(SessionSettings::from_config(&config)),
    };

    if let Some(udp) = &config.udp {
        let relay = UdpRelay::bind(
            udp.address,
            config.limits.idle_timeout(),
            Duration::from_secs(udp.sweep_interval),
        )
        .await?;
        tokio::spawn(relay.run());
        info!("UDP relay started");
    }

    let gateway = Gateway::bind(config.listen.address, ctx).await?;
    gateway.run().await?;

    Ok(())
}

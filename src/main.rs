// src/main.rs
// HtREST server entry point

use anyhow::{Context, Result};
use clap::Parser;
use htrest::api::create_router;
use htrest::config::HtRestConfig;
use htrest::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv(); // Load .env from current directory

    let config = HtRestConfig::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting HtREST {}", env!("CARGO_PKG_VERSION"));

    let catalog = config
        .load_catalog()
        .context("failed to load the parameter catalog")?;
    info!("Loaded {} parameter definitions", catalog.len());

    let device = config.simulated_device(catalog.clone());
    warn!(
        "Serving requests from the simulated heat pump driver; {} at {} baud is not accessed",
        config.device, config.baudrate
    );
    let state = AppState::new(device, catalog)
        .with_policy(config.policy())
        .with_verification(config.verify_params())
        .with_credentials(config.user.clone());

    if config.bool_as_int {
        info!("Boolean values are rendered as 0/1");
    }
    if config.read_only {
        warn!("Read-only mode, no value will be written to the heat pump");
    }
    if !config.verify_params() {
        warn!("Parameter verification disabled");
    }
    if state.credentials.is_none() {
        warn!("No credentials configured, the API is open to everyone");
    }

    let (serial, (version, build)) = state
        .session
        .interact(|hp| Ok((hp.get_serial_number()?, hp.get_version()?)))
        .await
        .context("failed to query the heat pump identity")?;
    info!("Simulated heat pump reports serial number {}", serial);
    info!("Simulated software version = {} ({})", version, build);

    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("HtREST running on http://{}/api/v1", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HtREST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

//! TAIS Relay (tais-relay) - Main entry point
//!
//! Ingests surveillance batches over HTTP and streams normalized track and
//! flight-plan updates to connected consumers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tais_relay::altimeter::{Altimeter, AltimeterRefresher, MetarClient, RefreshPolicy};
use tais_relay::api::{self, AppContext};
use tais_relay::config::{Config, ConfigOverrides};
use tais_relay::identity::IdentityRegistry;
use tais_relay::ingest::Ingestor;
use tais_relay::ownership::OwnershipTracker;
use tais_relay::state::AircraftStore;
use tais_relay::stream::{Publisher, PublisherSettings};

/// Command-line arguments for tais-relay
#[derive(Parser, Debug)]
#[command(name = "tais-relay")]
#[command(about = "Radar track correlation and update relay")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "TAIS_RELAY_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(long, env = "TAIS_RELAY_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Publish tracks with neither squawk nor Mode-S code
    #[arg(long, env = "TAIS_RELAY_EMIT_PRIMARY_TARGETS")]
    emit_primary_targets: Option<bool>,

    /// METAR endpoint for the altimeter setting
    #[arg(long, env = "TAIS_RELAY_ALTIMETER_URL")]
    altimeter_url: Option<String>,

    /// Bearer token for the METAR endpoint
    #[arg(long, env = "TAIS_RELAY_ALTIMETER_TOKEN", hide_env_values = true)]
    altimeter_token: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "TAIS_RELAY_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        port: args.port,
        bind_address: args.bind_address,
        emit_primary_targets: args.emit_primary_targets,
        altimeter_url: args.altimeter_url,
        altimeter_token: args.altimeter_token,
        log_level: args.log_level,
    };
    let config = Config::load(args.config.as_deref(), overrides)
        .context("Failed to load configuration")?;

    // Initialize tracing
    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tais_relay={},tais_common={},tower_http={}", level, level, level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting TAIS relay v{} ({}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config.source {
        Some(path) => info!("Loaded TOML configuration from {}", path.display()),
        None => warn!("No config file found, using built-in defaults"),
    }
    info!(
        port = config.port,
        emit_primary_targets = config.emit_primary_targets,
        refresh_interval_secs = config.altimeter.refresh_interval_secs,
        "Configuration loaded"
    );

    let cancel = CancellationToken::new();

    // Altimeter setting and its refresh task
    let altimeter = Arc::new(Altimeter::new(
        config.altimeter.initial_setting_inhg,
        config.altimeter.refresh_interval(),
    ));
    let source = MetarClient::new(
        config.altimeter.url.clone(),
        config.altimeter.token.clone(),
        config.altimeter.request_timeout(),
    )
    .context("Failed to create METAR client")?;
    info!(url = source.url(), "Altimeter source configured");
    let refresher = AltimeterRefresher::new(
        Arc::new(source),
        altimeter.clone(),
        RefreshPolicy::from(&config.altimeter),
    )
    .spawn(cancel.clone());

    // Shared correlation state
    let store = Arc::new(AircraftStore::new());
    let ingestor = Arc::new(Ingestor::new(
        Arc::new(IdentityRegistry::new()),
        altimeter.clone(),
        Arc::new(OwnershipTracker::new()),
        store.clone(),
        config.emit_primary_targets,
    ));
    let publisher = Arc::new(Publisher::new(
        store.clone(),
        PublisherSettings::from(&config),
    ));

    let ctx = AppContext {
        store,
        ingestor,
        altimeter,
        publisher,
        cancel: cancel.clone(),
    };
    let app = api::create_router(ctx, config.max_batch_bytes);

    api::run(
        &config.bind_address,
        config.port,
        app,
        api::shutdown_when(termination(), cancel.clone()),
    )
    .await
    .context("Server error")?;

    cancel.cancel();
    refresher.await.context("Altimeter refresh task panicked")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl-C or, on unix, SIGTERM from the service manager
async fn termination() {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = signal::ctrl_c() => info!("Received Ctrl+C"),
            _ = sigterm.recv() => info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C");
    }
}

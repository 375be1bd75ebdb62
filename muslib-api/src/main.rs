//! muslib-api - Song catalog HTTP service
//!
//! CRUD over a catalog of songs. New songs are enriched with release date,
//! lyrics and a reference link from an external lookup service before they
//! are stored.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use muslib_common::config::{
    load_config_file, resolve_config_path, CompiledDefaults, ConfigOverrides, ServiceConfig,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use muslib_api::services::EnrichmentClient;
use muslib_api::{build_router, AppState};

/// Command-line arguments for muslib-api
#[derive(Parser, Debug)]
#[command(name = "muslib-api")]
#[command(about = "Song catalog HTTP service")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "MUSLIB_BIND")]
    bind: Option<String>,

    /// SQLite database URL
    #[arg(long, env = "MUSLIB_DATABASE_URL")]
    database_url: Option<String>,

    /// Song detail lookup endpoint
    #[arg(long, env = "MUSLIB_ENRICHMENT_URL")]
    enrichment_url: Option<String>,

    /// Timeout for each lookup request, in seconds
    #[arg(long, env = "MUSLIB_ENRICHMENT_TIMEOUT_SECS")]
    enrichment_timeout_secs: Option<u64>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "MUSLIB_LOG_LEVEL")]
    log_level: Option<String>,

    /// TOML config file (falls back to MUSLIB_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind: self.bind.clone(),
            database_url: self.database_url.clone(),
            enrichment_url: self.enrichment_url.clone(),
            enrichment_timeout_secs: self.enrichment_timeout_secs,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let (toml_config, config_source) =
        load_config_file(config_path).context("Failed to load config file")?;
    let config = ServiceConfig::resolve(
        args.overrides(),
        toml_config,
        CompiledDefaults::for_current_platform(),
    )
    .context("Invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "muslib_api={level},muslib_common={level},tower_http={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting muslib-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_source.log();

    let pool = muslib_common::db::shared_pool(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    let enrichment = EnrichmentClient::new(config.enrichment_url.clone(), config.enrichment_timeout)
        .context("Failed to create enrichment client")?;
    info!("Enrichment service: {}", enrichment.base_url());

    let state = AppState::new(pool, Arc::new(enrichment));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .context("Failed to bind to address")?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read bound address")?;
    info!("Listening on http://{}", local_addr);
    info!("Health check: http://{}/health", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

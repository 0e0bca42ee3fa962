//! shelfsync-rc - catalog reconciliation microservice
//!
//! Serves `GET /process`, which fetches the stock inventory spreadsheet and
//! the storefront product feed, then reports storefront product ids whose
//! name has no inventory match. `GET /health` reports liveness.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shelfsync_common::config::{
    load_toml_config, resolve_config_path, ComparisonStrategy, ConfigOverrides, ServiceConfig,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfsync_rc::{build_router, AppState, ReconcilePipeline};

const MODULE_NAME: &str = "shelfsync-rc";

/// Command-line arguments for shelfsync-rc
#[derive(Parser, Debug)]
#[command(name = "shelfsync-rc")]
#[command(about = "Catalog reconciliation microservice for shelfsync")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/shelfsync/shelfsync-rc.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inventory spreadsheet URL
    #[arg(long, env = "SHELFSYNC_INVENTORY_SOURCE_URL")]
    inventory_source_url: Option<String>,

    /// Storefront product feed URL
    #[arg(long, env = "SHELFSYNC_CATALOG_SOURCE_URL")]
    catalog_source_url: Option<String>,

    /// Directory for date-stamped intermediate artifacts
    #[arg(long, env = "SHELFSYNC_OUTPUT_DIRECTORY")]
    output_directory: Option<PathBuf>,

    /// Catalog rows per batch for the chunked strategy
    #[arg(long, env = "SHELFSYNC_CHUNK_SIZE")]
    chunk_size: Option<usize>,

    /// Comparison strategy: auto, row_wise, bulk or chunked
    #[arg(long, env = "SHELFSYNC_STRATEGY")]
    strategy: Option<ComparisonStrategy>,

    /// Reuse the inventory key set while the inventory content is unchanged
    #[arg(long, env = "SHELFSYNC_CACHE_INVENTORY_KEYS")]
    cache_inventory_keys: Option<bool>,

    /// Address to bind
    #[arg(long, env = "SHELFSYNC_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SHELFSYNC_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SHELFSYNC_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            inventory_source_url: self.inventory_source_url.clone(),
            catalog_source_url: self.catalog_source_url.clone(),
            output_directory: self.output_directory.clone(),
            chunk_size: self.chunk_size,
            strategy: self.strategy,
            cache_inventory_keys: self.cache_inventory_keys,
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration is resolved before tracing so the log level can come from it
    let config_path = resolve_config_path(args.config.as_deref(), MODULE_NAME);
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => Default::default(),
    };
    let config = ServiceConfig::resolve(&args.overrides(), &toml_config)
        .context("Failed to resolve configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!(
                        "shelfsync_rc={0},shelfsync_common={0},tower_http=info",
                        config.log_level
                    )
                    .into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting shelfsync-rc v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => info!("Config file: {} (absent, defaults in use)", path.display()),
        None => info!("Config file: none (no platform config directory)"),
    }
    info!("Inventory source: {}", config.inventory_source_url);
    info!("Catalog source: {}", config.catalog_source_url);
    info!("Output directory: {}", config.output_directory.display());
    info!(
        "Comparison strategy: {} (chunk size {}, key-set cache {})",
        config.strategy,
        config.chunk_size,
        if config.cache_inventory_keys { "on" } else { "off" }
    );

    let pipeline = ReconcilePipeline::from_config(&config)
        .context("Failed to initialize upstream clients")?;
    let app = build_router(AppState::new(pipeline));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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

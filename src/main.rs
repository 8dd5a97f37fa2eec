//! Administrative configuration service.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌────────────────────────────────────────────────┐
//!                   │                 CONFIG ADMIN                   │
//!                   │                                                │
//!   Admin Request   │  ┌─────────┐   ┌──────────┐   ┌────────────┐  │
//!   ────────────────┼─▶│  http   │──▶│  admin   │──▶│  handlers  │  │
//!                   │  │ server  │   │auth gate │   └─────┬──────┘  │
//!                   │  └─────────┘   └──────────┘         │         │
//!                   │                                     ▼         │
//!                   │   ┌─────────┐  ┌─────────┐  ┌─────────────┐   │
//!                   │   │ archive │  │ backup  │  │    cache    │   │
//!                   │   │ zip r/w │  │ import  │  │ collaborator│   │
//!                   │   └─────────┘  └────┬────┘  └─────────────┘   │
//!                   │                     ▼                         │
//!                   │          configuration tree (disk)            │
//!                   │                                                │
//!                   │  ┌──────────────────────────────────────────┐ │
//!                   │  │          Cross-Cutting Concerns          │ │
//!                   │  │  ┌────────┐ ┌─────────────┐ ┌─────────┐  │ │
//!                   │  │  │ config │ │observability│ │lifecycle│  │ │
//!                   │  │  └────────┘ └─────────────┘ └─────────┘  │ │
//!                   │  └──────────────────────────────────────────┘ │
//!                   └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use config_admin::config::loader::load_config;
use config_admin::config::ServiceConfig;
use config_admin::observability::init_logging;
use config_admin::{AppState, HttpServer, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "config-admin", about = "Administrative configuration service")]
struct Args {
    /// Path to the service configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    // The settings document can pin a persisted log level; it wins over
    // the service config default.
    let settings_store =
        config_admin::config::SettingsStore::new(config.paths.settings_file());
    let log_level = match settings_store.load() {
        Ok(settings) => settings.logging.level,
        Err(_) => config.observability.log_level.clone(),
    };
    let log_handle = init_logging(&log_level);

    tracing::info!("config-admin v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        config_root = %config.paths.config_root.display(),
        max_upload_bytes = config.limits.max_upload_bytes,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let state = AppState::new(config, log_handle);

    // Warm the cache; a broken tree is reported but does not stop startup.
    match state.cache.initialize() {
        Ok(entries) => tracing::info!(entries, "Config cache warmed"),
        Err(e) => tracing::warn!(error = %e, "Config cache could not be warmed"),
    }

    let shutdown = Shutdown::new();
    let server = HttpServer::new(state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

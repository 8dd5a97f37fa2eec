//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all admin handlers
//! - Wire up middleware (tracing, request timeout, request ID)
//! - Bind the server to a listener and serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::admin::setup_admin_router;
use crate::cache::ConfigCache;
use crate::config::{ServiceConfig, SettingsStore};
use crate::observability::LogLevelHandle;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub cache: Arc<ConfigCache>,
    pub settings: Arc<SettingsStore>,
    pub log_level: LogLevelHandle,
    pub http_client: reqwest::Client,
    /// Serializes import, export, and cache refresh. Concurrent mutation
    /// of the configuration tree is unsafe without it.
    pub tree_gate: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(config: ServiceConfig, log_level: LogLevelHandle) -> Self {
        let cache = Arc::new(ConfigCache::new(&config.paths.config_root));
        let settings = Arc::new(SettingsStore::new(config.paths.settings_file()));
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.translate.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            config: Arc::new(config),
            cache,
            settings,
            log_level,
            http_client,
            tree_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

/// HTTP server for the admin API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around prepared application state.
    pub fn new(state: AppState) -> Self {
        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let request_id_header = HeaderName::from_static(X_REQUEST_ID);
        let request_secs = state.config.timeouts.request_secs;

        Router::new()
            .route("/health", get(health))
            .merge(setup_admin_router(state))
            .layer(TimeoutLayer::new(Duration::from_secs(request_secs)))
            .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
            .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown triggered");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
    }))
}

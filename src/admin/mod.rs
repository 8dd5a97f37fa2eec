//! Admin API subsystem.
//!
//! # Data Flow
//! ```text
//! request
//!     → bearer-token auth gate (auth.rs)
//!     → handler:
//!         backup.rs    export / import of the configuration tree
//!         cache.rs     cache refresh and stats
//!         settings.rs  platform auth settings
//!         translate.rs proxy to the language-model API
//!         logging.rs   runtime log verbosity
//! ```

pub mod auth;
pub mod backup;
pub mod cache;
pub mod logging;
pub mod settings;
pub mod translate;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use self::auth::admin_auth_middleware;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    let max_upload = state.config.limits.max_upload_bytes;

    Router::new()
        .route("/api/admin/config/export", get(backup::export_config))
        .route("/api/admin/config/import", post(backup::import_config))
        .route("/api/admin/cache/refresh", post(cache::refresh_cache))
        .route("/api/admin/cache/stats", get(cache::cache_stats))
        .route(
            "/api/admin/auth-settings",
            get(settings::get_auth_settings).put(settings::update_auth_settings),
        )
        .route("/api/admin/translate", post(translate::translate_text))
        .route(
            "/api/admin/logging",
            get(logging::get_log_config).put(logging::update_log_config),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

//! Cache refresh and statistics endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::cache::CacheStats;
use crate::http::error::AdminError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub stats: CacheStats,
}

/// POST /api/admin/cache/refresh
/// Drop every cached entry and rebuild from the configuration tree.
pub async fn refresh_cache(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AdminError> {
    let _gate = state.tree_gate.lock().await;

    let cache = state.cache.clone();
    let entries = tokio::task::spawn_blocking(move || cache.refresh_all())
        .await
        .map_err(|e| AdminError::Internal(format!("refresh task failed: {}", e)))??;

    Ok(Json(RefreshResponse {
        success: true,
        message: format!("cache rebuilt with {} entries", entries),
        stats: state.cache.stats(),
    }))
}

/// GET /api/admin/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

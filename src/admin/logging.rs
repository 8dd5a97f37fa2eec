//! Runtime log verbosity endpoints.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::error::AdminError;
use crate::http::server::AppState;
use crate::observability::LOG_LEVELS;

/// Relative cache key of the settings document inside the tree.
const SETTINGS_CACHE_KEY: &str = "platform-settings.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfigResponse {
    pub level: String,
    pub available_levels: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogConfigRequest {
    pub level: String,
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogConfigResponse {
    pub success: bool,
    pub message: String,
    pub level: String,
    pub persisted: bool,
}

/// GET /api/admin/logging
pub async fn get_log_config(State(state): State<AppState>) -> Json<LogConfigResponse> {
    Json(LogConfigResponse {
        level: state.log_level.current(),
        available_levels: LOG_LEVELS.to_vec(),
    })
}

/// PUT /api/admin/logging
pub async fn update_log_config(
    State(state): State<AppState>,
    Json(request): Json<UpdateLogConfigRequest>,
) -> Result<Json<UpdateLogConfigResponse>, AdminError> {
    state.log_level.set(&request.level)?;

    if request.persist {
        let level = request.level.clone();
        state.settings.update(|settings| {
            settings.logging.level = level;
        })?;
        if let Err(e) = state.cache.refresh_entry(SETTINGS_CACHE_KEY) {
            tracing::warn!(error = %e, "Log level persisted but cache entry refresh failed");
        }
    }

    Ok(Json(UpdateLogConfigResponse {
        success: true,
        message: format!("log level set to '{}'", request.level),
        level: request.level,
        persisted: request.persist,
    }))
}

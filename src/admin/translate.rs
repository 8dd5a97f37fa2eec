//! Translation proxy endpoint.
//!
//! Thin pass-through to the configured chat-completion API: build one
//! request, forward it, extract the translation. Model selection policy
//! beyond a config lookup lives upstream, not here.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::error::AdminError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub success: bool,
    pub translated_text: String,
    pub model: String,
}

/// POST /api/admin/translate
pub async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, AdminError> {
    if request.text.is_empty() {
        return Err(AdminError::BadRequest("text must not be empty".to_string()));
    }
    if request.target_language.is_empty() {
        return Err(AdminError::BadRequest(
            "targetLanguage must not be empty".to_string(),
        ));
    }

    let translate = &state.config.translate;
    if translate.api_key.is_empty() {
        return Err(AdminError::Internal(
            "translation API key is not configured".to_string(),
        ));
    }

    let model = match request.model {
        Some(model) => {
            // When the tree publishes a model list, the request must pick
            // from it.
            let available = state.cache.get_models(false);
            if !available.is_empty() && !available.iter().any(|m| m.name == model) {
                return Err(AdminError::BadRequest(format!(
                    "model '{}' is not available",
                    model
                )));
            }
            model
        }
        None => translate.default_model.clone(),
    };

    let endpoint = chat_completions_url(&translate.api_base)
        .map_err(|e| AdminError::Internal(format!("invalid translate.api_base: {}", e)))?;

    let body = serde_json::json!({
        "model": model,
        "messages": [
            {
                "role": "system",
                "content": format!(
                    "Translate the user's message into {}. Reply with the translation only.",
                    request.target_language
                ),
            },
            { "role": "user", "content": request.text },
        ],
    });

    let response = state
        .http_client
        .post(&endpoint)
        .bearer_auth(&translate.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| AdminError::Upstream(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AdminError::Upstream(format!("{}: {}", status, detail)));
    }

    let payload: serde_json::Value = response
        .json()
        .await
        .map_err(|e| AdminError::Upstream(e.to_string()))?;
    let translated_text = payload["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            AdminError::Upstream("upstream response carried no translation".to_string())
        })?
        .to_string();

    Ok(Json(TranslateResponse {
        success: true,
        translated_text,
        model,
    }))
}

/// Endpoint URL under the configured API base. A bare-origin base renders
/// with a trailing '/', so the rendered form is trimmed before the path
/// segment is appended.
fn chat_completions_url(api_base: &str) -> Result<String, url::ParseError> {
    let base = Url::parse(api_base)?;
    Ok(format!(
        "{}/chat/completions",
        base.as_str().trim_end_matches('/')
    ))
}

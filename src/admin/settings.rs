//! Platform authentication settings endpoints.
//!
//! GET returns the auth sections of the settings document with secrets
//! masked; PUT replaces whole sections, persists atomically, and reloads
//! the document's cache entry.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::store::{
    AuthSettings, AuthorizationSettings, LocalAuthSettings, OidcAuthSettings,
    PlatformSettings, ProxyAuthSettings,
};
use crate::http::error::AdminError;
use crate::http::server::AppState;

/// Relative cache key of the settings document inside the tree.
const SETTINGS_CACHE_KEY: &str = "platform-settings.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettingsView {
    pub auth: AuthSettings,
    pub proxy_auth: ProxyAuthSettings,
    pub local_auth: LocalAuthSettings,
    pub oidc_auth: OidcAuthView,
    pub authorization: AuthorizationSettings,
}

/// OIDC section with the client secret reduced to a presence flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcAuthView {
    pub enabled: bool,
    pub issuer_url: String,
    pub client_id: String,
    pub has_client_secret: bool,
}

impl From<&PlatformSettings> for AuthSettingsView {
    fn from(settings: &PlatformSettings) -> Self {
        Self {
            auth: settings.auth.clone(),
            proxy_auth: settings.proxy_auth.clone(),
            local_auth: settings.local_auth.clone(),
            oidc_auth: OidcAuthView {
                enabled: settings.oidc_auth.enabled,
                issuer_url: settings.oidc_auth.issuer_url.clone(),
                client_id: settings.oidc_auth.client_id.clone(),
                has_client_secret: settings.oidc_auth.client_secret.is_some(),
            },
            authorization: settings.authorization.clone(),
        }
    }
}

/// Section-level replacement request. Absent sections are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateAuthSettingsRequest {
    pub auth: Option<AuthSettings>,
    pub proxy_auth: Option<ProxyAuthSettings>,
    pub local_auth: Option<LocalAuthSettings>,
    pub oidc_auth: Option<OidcAuthSettings>,
    pub authorization: Option<AuthorizationSettings>,
}

impl UpdateAuthSettingsRequest {
    fn is_empty(&self) -> bool {
        self.auth.is_none()
            && self.proxy_auth.is_none()
            && self.local_auth.is_none()
            && self.oidc_auth.is_none()
            && self.authorization.is_none()
    }

    fn validate(&self) -> Result<(), AdminError> {
        if let Some(local) = &self.local_auth {
            if local.enabled && local.min_password_length == 0 {
                return Err(AdminError::BadRequest(
                    "localAuth.minPasswordLength must be greater than zero".to_string(),
                ));
            }
        }
        if let Some(oidc) = &self.oidc_auth {
            if oidc.enabled && (oidc.issuer_url.is_empty() || oidc.client_id.is_empty()) {
                return Err(AdminError::BadRequest(
                    "oidcAuth requires issuerUrl and clientId when enabled".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// GET /api/admin/auth-settings
pub async fn get_auth_settings(
    State(state): State<AppState>,
) -> Result<Json<AuthSettingsView>, AdminError> {
    let settings = state.settings.load()?;
    Ok(Json(AuthSettingsView::from(&settings)))
}

/// PUT /api/admin/auth-settings
pub async fn update_auth_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateAuthSettingsRequest>,
) -> Result<Json<AuthSettingsView>, AdminError> {
    if request.is_empty() {
        return Err(AdminError::BadRequest(
            "no auth settings sections provided".to_string(),
        ));
    }
    request.validate()?;

    let updated = state.settings.update(|settings| {
        if let Some(auth) = request.auth {
            settings.auth = auth;
        }
        if let Some(proxy_auth) = request.proxy_auth {
            settings.proxy_auth = proxy_auth;
        }
        if let Some(local_auth) = request.local_auth {
            settings.local_auth = local_auth;
        }
        if let Some(oidc_auth) = request.oidc_auth {
            settings.oidc_auth = oidc_auth;
        }
        if let Some(authorization) = request.authorization {
            settings.authorization = authorization;
        }
    })?;

    if let Err(e) = state.cache.refresh_entry(SETTINGS_CACHE_KEY) {
        tracing::warn!(error = %e, "Settings saved but cache entry refresh failed");
    }

    Ok(Json(AuthSettingsView::from(&updated)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_masks_client_secret() {
        let mut settings = PlatformSettings::default();
        settings.oidc_auth.client_secret = Some("hunter2".to_string());

        let view = AuthSettingsView::from(&settings);
        assert!(view.oidc_auth.has_client_secret);
        let raw = serde_json::to_string(&view).unwrap();
        assert!(!raw.contains("hunter2"));
    }

    #[test]
    fn test_empty_update_detected() {
        assert!(UpdateAuthSettingsRequest::default().is_empty());
    }

    #[test]
    fn test_enabled_oidc_requires_issuer_and_client() {
        let request = UpdateAuthSettingsRequest {
            oidc_auth: Some(OidcAuthSettings {
                enabled: true,
                issuer_url: String::new(),
                client_id: "app".to_string(),
                client_secret: None,
            }),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}

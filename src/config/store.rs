//! Persisted platform settings.
//!
//! # Responsibilities
//! - Model the platform-settings JSON document (auth sections, logging)
//! - Read-modify-write updates with atomic replace
//! - Tolerate unknown sections written by other tools
//!
//! # Design Decisions
//! - Writes go to a temp file in the same directory, then rename; a reader
//!   never observes a partially written document
//! - Unknown top-level keys are preserved through updates via a flattened map
//! - A missing file reads as the default document, not an error

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or persisting the settings document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to replace settings file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// The persisted platform settings document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformSettings {
    pub auth: AuthSettings,
    pub proxy_auth: ProxyAuthSettings,
    pub local_auth: LocalAuthSettings,
    pub oidc_auth: OidcAuthSettings,
    pub authorization: AuthorizationSettings,
    pub logging: LoggingSettings,

    /// Sections this service does not own. Preserved verbatim across
    /// read-modify-write cycles.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Global authentication toggle and session policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthSettings {
    pub enabled: bool,
    pub allow_registration: bool,
    pub session_ttl_minutes: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_registration: false,
            session_ttl_minutes: 12 * 60,
        }
    }
}

/// Trusted reverse-proxy header authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyAuthSettings {
    pub enabled: bool,
    pub header_name: String,
}

impl Default for ProxyAuthSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            header_name: "X-Forwarded-User".to_string(),
        }
    }
}

/// Username/password authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalAuthSettings {
    pub enabled: bool,
    pub min_password_length: usize,
}

impl Default for LocalAuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_password_length: 8,
        }
    }
}

/// OpenID Connect authentication.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct OidcAuthSettings {
    pub enabled: bool,
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
}

/// Role and group authorization policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthorizationSettings {
    pub admin_groups: Vec<String>,
    pub default_role: String,
}

impl Default for AuthorizationSettings {
    fn default() -> Self {
        Self {
            admin_groups: Vec::new(),
            default_role: "user".to_string(),
        }
    }
}

/// Logging section of the settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Handle to the settings document on disk.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current document. A missing file yields the defaults.
    pub fn load(&self) -> Result<PlatformSettings, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(PlatformSettings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the document atomically: write to a temp file in the same
    /// directory, then rename over the target.
    pub fn save(&self, settings: &PlatformSettings) -> Result<(), StoreError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut tmp, settings)?;
        tmp.persist(&self.path)?;
        Ok(())
    }

    /// Read-modify-write update of the document.
    pub fn update<F>(&self, mutate: F) -> Result<PlatformSettings, StoreError>
    where
        F: FnOnce(&mut PlatformSettings),
    {
        let mut settings = self.load()?;
        mutate(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}

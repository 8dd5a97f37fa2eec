//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check value ranges (limits > 0, addresses parse)
//! - Catch placeholder credentials before they reach production
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    EmptyApiKey,
    ZeroUploadLimit,
    EmptyConfigRoot,
    ZeroTranslateTimeout,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address '{}' is not a socket address", addr)
            }
            ValidationError::EmptyApiKey => write!(f, "admin.api_key must not be empty"),
            ValidationError::ZeroUploadLimit => {
                write!(f, "limits.max_upload_bytes must be greater than zero")
            }
            ValidationError::EmptyConfigRoot => write!(f, "paths.config_root must not be empty"),
            ValidationError::ZeroTranslateTimeout => {
                write!(f, "translate.timeout_secs must be greater than zero")
            }
        }
    }
}

/// Validate a deserialized configuration, returning every failure found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.admin.api_key.is_empty() {
        errors.push(ValidationError::EmptyApiKey);
    }

    if config.limits.max_upload_bytes == 0 {
        errors.push(ValidationError::ZeroUploadLimit);
    }

    if config.paths.config_root.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyConfigRoot);
    }

    if config.translate.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTranslateTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

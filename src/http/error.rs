//! Error-to-response mapping for the admin API.
//!
//! Taxonomy:
//! - client-input errors (missing upload, bad field, invalid level,
//!   archive without the designated folder) → 400
//! - authentication failures → 401
//! - upstream translation failures → 502
//! - unexpected IO / archive / serialization errors → 500, with the
//!   underlying message surfaced for operator diagnosis

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::backup::ImportError;
use crate::cache::CacheError;
use crate::config::store::StoreError;
use crate::observability::LoggingError;

/// Error type shared by every admin handler.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Settings(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl AdminError {
    fn status(&self) -> StatusCode {
        match self {
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::Unauthorized => StatusCode::UNAUTHORIZED,
            AdminError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AdminError::Archive(_)
            | AdminError::Cache(_)
            | AdminError::Settings(_)
            | AdminError::Io(_)
            | AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ImportError> for AdminError {
    fn from(e: ImportError) -> Self {
        match e {
            // A structurally invalid archive is the client's problem.
            ImportError::MissingFolder(folder) => AdminError::BadRequest(format!(
                "uploaded archive does not contain a '{}' folder",
                folder
            )),
            ImportError::Archive(ArchiveError::Zip(e)) => {
                AdminError::BadRequest(format!("uploaded file is not a readable zip archive: {}", e))
            }
            ImportError::Archive(e) => AdminError::Archive(e),
            ImportError::Io(e) => AdminError::Io(e),
            ImportError::Cache(e) => AdminError::Cache(e),
        }
    }
}

impl From<LoggingError> for AdminError {
    fn from(e: LoggingError) -> Self {
        match e {
            LoggingError::InvalidLevel(level) => {
                AdminError::BadRequest(format!("'{}' is not a valid log level", level))
            }
            LoggingError::Reload(msg) => AdminError::Internal(msg),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(status = %status, message, "Admin request failed");
        } else {
            tracing::debug!(status = %status, message, "Admin request rejected");
        }
        let body = Json(serde_json::json!({
            "success": false,
            "message": message,
        }));
        (status, body).into_response()
    }
}

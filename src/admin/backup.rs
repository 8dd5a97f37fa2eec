//! Export and import of the configuration tree.
//!
//! Export spools the archive to an anonymous temp file, then streams it to
//! the client; memory use stays bounded by the copy buffer regardless of
//! tree size. Once streaming has begun a failure can only truncate the
//! download, so archive construction completes before the first byte is
//! sent.
//!
//! Import receives the archive as a multipart upload, spools it to the work
//! directory, and hands it to the blocking import sequence. The upload file
//! and extraction directory are removed on success and failure alike.

use std::io::{Seek, SeekFrom};

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::Response;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::archive::{write_config_archive, ArchiveSummary, BackupMetadata};
use crate::backup::run_import;
use crate::http::error::AdminError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub imported_files: u64,
    pub backup_path: Option<String>,
    pub metadata: Option<BackupMetadata>,
    pub note: Option<String>,
}

/// GET /api/admin/config/export
/// Download the configuration tree as a ZIP attachment.
pub async fn export_config(State(state): State<AppState>) -> Result<Response, AdminError> {
    let _gate = state.tree_gate.lock().await;

    let root = state.config.paths.config_root.clone();
    let work_dir = state.config.paths.work_dir.clone();

    let (spool, summary) = tokio::task::spawn_blocking(
        move || -> Result<(std::fs::File, ArchiveSummary), AdminError> {
            std::fs::create_dir_all(&work_dir)?;
            // Anonymous temp file: unlinked at creation, gone when dropped.
            let mut spool = tempfile::tempfile_in(&work_dir)?;
            let summary = write_config_archive(&root, &mut spool, "configuration export")?;
            spool.seek(SeekFrom::Start(0))?;
            Ok((spool, summary))
        },
    )
    .await
    .map_err(|e| AdminError::Internal(format!("export task failed: {}", e)))??;

    tracing::info!(files = summary.file_count, "Streaming configuration export");

    let stream = ReaderStream::new(tokio::fs::File::from_std(spool));
    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export_filename()),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AdminError::Internal(e.to_string()))?;
    Ok(response)
}

/// POST /api/admin/config/import
/// Replace the configuration tree with an uploaded archive.
pub async fn import_config(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AdminError> {
    let _gate = state.tree_gate.lock().await;

    let work_dir = state.config.paths.work_dir.clone();
    tokio::fs::create_dir_all(&work_dir).await?;

    let mut upload: Option<tempfile::NamedTempFile> = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AdminError::BadRequest(format!("invalid multipart upload: {}", e)))?
    {
        if field.name() != Some("backup") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        if !is_zip_upload(&file_name, content_type.as_deref()) {
            return Err(AdminError::BadRequest(
                "the backup upload must be a .zip archive".to_string(),
            ));
        }

        let tmp = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".zip")
            .tempfile_in(&work_dir)?;
        let mut out = tokio::fs::File::from_std(tmp.reopen()?);
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AdminError::BadRequest(format!("upload failed: {}", e)))?
        {
            out.write_all(&chunk).await?;
        }
        out.flush().await?;
        upload = Some(tmp);
        break;
    }

    let Some(tmp) = upload else {
        return Err(AdminError::BadRequest(
            "no backup file uploaded".to_string(),
        ));
    };

    let import_id = uuid::Uuid::new_v4();
    tracing::info!(import_id = %import_id, "Starting configuration import");

    let config_root = state.config.paths.config_root.clone();
    let cache = state.cache.clone();
    let report = tokio::task::spawn_blocking(move || {
        let result = run_import(&config_root, &work_dir, tmp.path(), &cache);
        // Uploaded archive is removed here on every path.
        drop(tmp);
        result
    })
    .await
    .map_err(|e| AdminError::Internal(format!("import task failed: {}", e)))??;

    tracing::info!(
        import_id = %import_id,
        files = report.imported_files,
        "Configuration import succeeded"
    );

    let note = report
        .backup_path
        .as_ref()
        .map(|b| format!("previous configuration preserved as '{}'", b));

    Ok(Json(ImportResponse {
        success: true,
        message: format!("imported {} files", report.imported_files),
        imported_files: report.imported_files,
        backup_path: report.backup_path,
        metadata: report.metadata,
        note,
    }))
}

fn export_filename() -> String {
    let timestamp = Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "");
    format!("config-admin-config-backup-{}.zip", timestamp)
}

fn is_zip_upload(file_name: &str, content_type: Option<&str>) -> bool {
    let name_ok = file_name.to_ascii_lowercase().ends_with(".zip");
    let type_ok = matches!(
        content_type,
        None | Some("application/zip")
            | Some("application/x-zip-compressed")
            | Some("application/octet-stream")
    );
    name_ok && type_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_upload_detection() {
        assert!(is_zip_upload("backup.zip", Some("application/zip")));
        assert!(is_zip_upload("BACKUP.ZIP", None));
        assert!(is_zip_upload("backup.zip", Some("application/octet-stream")));
        assert!(!is_zip_upload("backup.tar.gz", Some("application/gzip")));
        assert!(!is_zip_upload("backup.zip", Some("text/plain")));
        assert!(!is_zip_upload("", None));
    }

    #[test]
    fn test_export_filename_has_no_separators() {
        let name = export_filename();
        assert!(name.starts_with("config-admin-config-backup-"));
        assert!(name.ends_with(".zip"));
        assert!(!name.contains(':'));
        assert_eq!(name.matches('.').count(), 1);
    }
}

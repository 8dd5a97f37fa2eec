//! Import orchestration: uploaded archive → live configuration tree.
//!
//! # Data Flow
//! ```text
//! uploaded archive
//!     → extract into fresh temp dir under the work dir
//!     → (no designated folder? reject, live tree untouched)
//!     → rename live tree aside as the timestamped backup
//!     → rename extracted tree into place
//!     → cache clear + initialize
//!     → count files, report
//! temp artifacts removed on every exit path
//! ```
//!
//! # Design Decisions
//! - The live tree is swapped by rename, so no request ever sees a
//!   half-written tree; the renamed-aside tree doubles as the backup
//! - rename fails across filesystems; both moves fall back to a
//!   recursive copy, with a separate best-effort snapshot covering the
//!   destructive window of that path
//! - The snapshot step never fails the import; the replace step always does

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use crate::archive::{extract_config_entries, ArchiveError, BackupMetadata};
use crate::backup::fsops::{copy_dir_recursive, count_files};
use crate::cache::{CacheError, ConfigCache};

/// Errors from the import sequence.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The archive holds no entry under the designated folder.
    #[error("archive does not contain a '{0}' folder")]
    MissingFolder(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache reload after import failed: {0}")]
    Cache(#[from] CacheError),
}

/// Summary returned to the caller after a completed import.
#[derive(Debug)]
pub struct ImportReport {
    /// Files now present under the live tree.
    pub imported_files: u64,
    /// Basename of the backup directory, when one was created.
    pub backup_path: Option<String>,
    /// Metadata record carried by the archive, if any.
    pub metadata: Option<BackupMetadata>,
}

/// Run the full import sequence against `archive_path`. Blocking; call
/// from `spawn_blocking` in async context.
pub fn run_import(
    config_root: &Path,
    work_dir: &Path,
    archive_path: &Path,
    cache: &ConfigCache,
) -> Result<ImportReport, ImportError> {
    let folder = config_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());

    fs::create_dir_all(work_dir)?;
    let extract_dir = tempfile::Builder::new()
        .prefix("import-")
        .tempdir_in(work_dir)?;

    let outcome = extract_config_entries(archive_path, extract_dir.path(), &folder)?;
    if outcome.extracted == 0 {
        return Err(ImportError::MissingFolder(folder));
    }
    let extracted_root = extract_dir.path().join(&folder);

    let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let backup_dir = sibling_path(config_root, &format!("{}-backup-{}", folder, timestamp));

    let mut backup_path = None;
    if config_root.exists() {
        match fs::rename(config_root, &backup_dir) {
            Ok(()) => {
                backup_path = Some(backup_basename(&backup_dir));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not rename tree aside; taking copy snapshot");
                match copy_dir_recursive(config_root, &backup_dir) {
                    Ok(files) => {
                        tracing::info!(files, backup = %backup_dir.display(), "Snapshot copied");
                        backup_path = Some(backup_basename(&backup_dir));
                    }
                    Err(e) => {
                        // Best-effort: a failed snapshot does not stop the import.
                        tracing::warn!(error = %e, "Snapshot failed; continuing without backup");
                    }
                }
                fs::remove_dir_all(config_root)?;
            }
        }
    }

    if let Err(e) = fs::rename(&extracted_root, config_root) {
        tracing::debug!(error = %e, "Rename into place failed; copying extracted tree");
        copy_dir_recursive(&extracted_root, config_root)?;
    }

    cache.clear();
    cache.initialize()?;

    let imported_files = count_files(config_root);
    tracing::info!(
        imported_files,
        backup = backup_path.as_deref().unwrap_or("none"),
        "Configuration import complete"
    );

    Ok(ImportReport {
        imported_files,
        backup_path,
        metadata: outcome.metadata,
    })
}

fn sibling_path(path: &Path, name: &str) -> PathBuf {
    path.parent()
        .map(|p| p.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}

fn backup_basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

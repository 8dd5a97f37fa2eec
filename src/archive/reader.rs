//! Archive extraction: ZIP → extraction directory.
//!
//! # Responsibilities
//! - Accept entries under the designated folder, flat or wrapped one level
//!   deep by a desktop archiving tool
//! - Skip directory markers, OS metadata, and unrelated extra content
//! - Capture the metadata entry without extracting it
//! - Reject path traversal in entry names
//!
//! # Design Decisions
//! - Entries are processed strictly one at a time; the next entry is not
//!   read until the current output file is closed
//! - A skipped entry is never an error; a failed read or write always is

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::archive::metadata::{BackupMetadata, METADATA_ENTRY_NAME};
use crate::archive::ArchiveError;

/// Result of an extraction pass.
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    /// Files written under the designated folder.
    pub extracted: usize,
    /// Entries dropped by the filters.
    pub skipped: usize,
    /// Parsed metadata record, when the archive carried one.
    pub metadata: Option<BackupMetadata>,
}

/// Extract the designated-folder entries of `archive_path` into
/// `dest_dir/<folder>/`. Entries outside the folder, directory markers,
/// and OS metadata are skipped.
pub fn extract_config_entries(
    archive_path: &Path,
    dest_dir: &Path,
    folder: &str,
) -> Result<ExtractOutcome, ArchiveError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut outcome = ExtractOutcome::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().replace('\\', "/");

        // Directory markers are implied by file paths.
        if name.ends_with('/') {
            outcome.skipped += 1;
            continue;
        }

        if is_os_metadata(&name) {
            tracing::debug!(entry = %name, "Skipping OS metadata entry");
            outcome.skipped += 1;
            continue;
        }

        if last_segment(&name) == METADATA_ENTRY_NAME {
            let mut raw = String::new();
            io::Read::read_to_string(&mut entry, &mut raw)?;
            match serde_json::from_str::<BackupMetadata>(&raw) {
                Ok(metadata) => outcome.metadata = Some(metadata),
                Err(e) => {
                    tracing::warn!(error = %e, "Backup metadata entry is unreadable; ignoring it")
                }
            }
            continue;
        }

        let Some(rest) = designated_rest(&name, folder) else {
            tracing::debug!(entry = %name, "Skipping entry outside designated folder");
            outcome.skipped += 1;
            continue;
        };

        let Some(rel) = safe_relative_path(rest) else {
            tracing::warn!(entry = %name, "Skipping entry with unsafe path");
            outcome.skipped += 1;
            continue;
        };

        let target = dest_dir.join(folder).join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        // Output handle closes here, before the next entry is opened.
        drop(out);
        outcome.extracted += 1;
    }

    tracing::info!(
        extracted = outcome.extracted,
        skipped = outcome.skipped,
        has_metadata = outcome.metadata.is_some(),
        "Archive extraction finished"
    );
    Ok(outcome)
}

/// Path of an accepted entry relative to the designated folder, or None
/// when the entry does not live under it. The folder must be the first
/// segment, or the second behind exactly one wrapper segment added by an
/// archiving tool. Deeper occurrences of the folder name do not count.
fn designated_rest<'a>(name: &'a str, folder: &str) -> Option<&'a str> {
    let head = format!("{}/", folder);
    let rest = name.strip_prefix(&head).or_else(|| {
        let (wrapper, remainder) = name.split_once('/')?;
        if wrapper.is_empty() {
            return None;
        }
        remainder.strip_prefix(&head)
    })?;
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// True for platform sidecar files that archiving tools sprinkle into
/// archives: macOS resource forks and Finder metadata, Windows thumbnail
/// caches.
fn is_os_metadata(name: &str) -> bool {
    name.split('/').any(|segment| {
        segment == "__MACOSX"
            || segment == ".DS_Store"
            || segment == "Thumbs.db"
            || segment.starts_with("._")
    })
}

fn last_segment(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Validate a captured relative path: no absolute components, no parent
/// traversal. Returns the path ready to join under the extraction root.
fn safe_relative_path(rest: &str) -> Option<PathBuf> {
    let path = Path::new(rest);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

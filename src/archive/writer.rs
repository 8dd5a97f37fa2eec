//! Archive construction: configuration tree → ZIP.
//!
//! # Responsibilities
//! - Walk the tree and add every regular file as a deflated entry
//! - Name entries relative to the tree root's parent, so each one is
//!   prefixed with the designated folder name
//! - Append the provenance metadata entry last
//!
//! # Design Decisions
//! - Unreadable files are skipped with a warning; enumeration is
//!   best-effort, not transactional
//! - Archive-level write errors abort: a truncated archive must not be
//!   reported as a success

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::metadata::{BackupMetadata, METADATA_ENTRY_NAME};
use crate::archive::ArchiveError;

/// Result of a completed export.
#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    pub file_count: usize,
    pub metadata: BackupMetadata,
}

/// Write a ZIP archive of every regular file under `root` to `out`,
/// followed by the metadata entry.
pub fn write_config_archive<W: Write + Seek>(
    root: &Path,
    out: W,
    description: &str,
) -> Result<ArchiveSummary, ArchiveError> {
    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let prefix = root.parent().unwrap_or(root);
    let mut file_count = 0usize;
    let mut buf = vec![0u8; 64 * 1024];

    for entry in WalkDir::new(root).into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable path during export");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry_name(prefix, entry.path());
        let mut file = match File::open(entry.path()) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "Skipping unreadable file during export");
                continue;
            }
        };

        zip.start_file(name.as_str(), options)?;
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            zip.write_all(&buf[..n])?;
        }
        file_count += 1;
    }

    let metadata = BackupMetadata::new(description, file_count);
    zip.start_file(METADATA_ENTRY_NAME, options)?;
    let record = serde_json::to_vec_pretty(&metadata)?;
    zip.write_all(&record)?;

    zip.finish()?;

    tracing::info!(files = file_count, root = %root.display(), "Configuration archive written");
    Ok(ArchiveSummary {
        file_count,
        metadata,
    })
}

/// Archive entry name for `path`, relative to `prefix`, '/'-separated.
fn entry_name(prefix: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(prefix).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use zip::ZipArchive;

    fn seed_tree(root: &Path) {
        fs::create_dir_all(root.join("presets")).unwrap();
        fs::write(root.join("app.json"), r#"{"name": "demo"}"#).unwrap();
        fs::write(root.join("presets/default.json"), r#"{"preset": true}"#).unwrap();
    }

    #[test]
    fn test_entries_are_prefixed_with_folder_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("config");
        seed_tree(&root);

        let mut cursor = Cursor::new(Vec::new());
        let summary = write_config_archive(&root, &mut cursor, "test export").unwrap();
        assert_eq!(summary.file_count, 2);

        let mut archive = ZipArchive::new(cursor).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"config/app.json".to_string()));
        assert!(names.contains(&"config/presets/default.json".to_string()));
        assert!(names.contains(&METADATA_ENTRY_NAME.to_string()));
    }

    #[test]
    fn test_metadata_entry_records_file_count() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("config");
        seed_tree(&root);

        let mut cursor = Cursor::new(Vec::new());
        write_config_archive(&root, &mut cursor, "nightly").unwrap();

        let mut archive = ZipArchive::new(cursor).unwrap();
        let mut entry = archive.by_name(METADATA_ENTRY_NAME).unwrap();
        let mut raw = String::new();
        entry.read_to_string(&mut raw).unwrap();
        let metadata: BackupMetadata = serde_json::from_str(&raw).unwrap();
        assert_eq!(metadata.file_count, 2);
        assert_eq!(metadata.description, "nightly");
    }

    #[test]
    fn test_empty_tree_still_produces_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("config");
        fs::create_dir_all(&root).unwrap();

        let mut cursor = Cursor::new(Vec::new());
        let summary = write_config_archive(&root, &mut cursor, "empty").unwrap();
        assert_eq!(summary.file_count, 0);

        let archive = ZipArchive::new(cursor).unwrap();
        assert_eq!(archive.len(), 1);
    }
}

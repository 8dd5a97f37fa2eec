//! Provenance record appended to every exported archive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved entry name for the metadata record. Lives at the archive root,
/// outside the designated folder, so it can never collide with a content
/// file and is never extracted into the tree.
pub const METADATA_ENTRY_NAME: &str = "__backup_metadata.json";

/// Current archive format version.
pub const FORMAT_VERSION: u32 = 1;

/// Export provenance: when, what format, how many entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    pub exported_at: DateTime<Utc>,
    pub format_version: u32,
    pub description: String,
    pub file_count: usize,
}

impl BackupMetadata {
    pub fn new(description: impl Into<String>, file_count: usize) -> Self {
        Self {
            exported_at: Utc::now(),
            format_version: FORMAT_VERSION,
            description: description.into(),
            file_count,
        }
    }
}

//! ZIP archive read/write for configuration backups.
//!
//! # Data Flow
//! ```text
//! Export:
//!     configuration tree
//!         → writer.rs (walk, deflate each file, append metadata entry)
//!         → archive bytes (any Write + Seek sink)
//!
//! Import:
//!     uploaded archive
//!         → reader.rs (sequential entry scan, designated-folder filter,
//!           OS-metadata skip, traversal-safe extraction)
//!         → extraction directory + optional parsed metadata
//! ```
//!
//! # Design Decisions
//! - Entry names always use '/' separators, regardless of platform
//! - One entry is open at a time on both paths; handle use is O(1)
//! - The metadata entry is informational; a missing or corrupt record
//!   never fails an import

pub mod metadata;
pub mod reader;
pub mod writer;

pub use metadata::{BackupMetadata, FORMAT_VERSION, METADATA_ENTRY_NAME};
pub use reader::{extract_config_entries, ExtractOutcome};
pub use writer::{write_config_archive, ArchiveSummary};

use thiserror::Error;

/// Errors from archive construction or extraction.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to serialize archive metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

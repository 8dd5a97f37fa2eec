//! Backup and restore of the configuration tree.
//!
//! Export is the archive writer plus response streaming, owned by the
//! admin handlers; this module owns the destructive direction: the import
//! state sequence and the recursive file-system helpers it leans on.

pub mod fsops;
pub mod import;

pub use import::{run_import, ImportError, ImportReport};

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! service config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! platform settings (JSON, lives inside the configuration tree)
//!     → store.rs (load / atomic read-modify-write)
//!     → edited at runtime through the admin endpoints
//! ```
//!
//! # Design Decisions
//! - Service config is immutable once loaded; changes require restart
//! - Platform settings are the mutable document; every write is atomic
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;

pub use schema::ServiceConfig;
pub use store::{PlatformSettings, SettingsStore};

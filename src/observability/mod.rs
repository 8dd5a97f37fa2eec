//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Admin logging endpoint (reads + swaps the active level)
//! ```
//!
//! # Design Decisions
//! - Structured logging via the tracing crate
//! - The active filter is wrapped in a reload layer so the admin API can
//!   change verbosity at runtime

pub mod logging;

pub use logging::{init_logging, LogLevelHandle, LoggingError, LOG_LEVELS};

//! Structured logging with a runtime-adjustable level.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Map the seven-level application scale onto tracing levels
//! - Swap the active filter when the admin endpoint changes the level
//!
//! # Design Decisions
//! - A reload handle wraps the EnvFilter so level changes apply without
//!   restarting; the handle is cloned into app state
//! - RUST_LOG, when set, wins at startup
//! - `http` sits between info and debug upstream; here it maps to debug.
//!   `verbose` and `silly` both map to trace, the finest tracing has

use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// The fixed application-level log scale, coarsest first.
pub const LOG_LEVELS: [&str; 7] = [
    "error", "warn", "info", "http", "verbose", "debug", "silly",
];

/// Errors from runtime level changes.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("'{0}' is not a valid log level")]
    InvalidLevel(String),

    #[error("failed to apply log level: {0}")]
    Reload(String),
}

/// Tracing filter directive for an application level, or None when the
/// level is not part of the scale.
pub fn tracing_directive(level: &str) -> Option<&'static str> {
    match level {
        "error" => Some("error"),
        "warn" => Some("warn"),
        "info" => Some("info"),
        "http" | "debug" => Some("debug"),
        "verbose" | "silly" => Some("trace"),
        _ => None,
    }
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Clonable handle for reading and changing the active log level.
#[derive(Clone)]
pub struct LogLevelHandle {
    current: Arc<RwLock<String>>,
    handle: Option<FilterHandle>,
}

impl LogLevelHandle {
    /// Handle without a live subscriber. Level changes are recorded but
    /// not applied; used in tests that cannot own the global subscriber.
    pub fn detached(level: &str) -> Self {
        Self {
            current: Arc::new(RwLock::new(level.to_string())),
            handle: None,
        }
    }

    /// The currently active application level.
    pub fn current(&self) -> String {
        self.current.read().unwrap().clone()
    }

    /// Switch the active level.
    pub fn set(&self, level: &str) -> Result<(), LoggingError> {
        let directive = tracing_directive(level)
            .ok_or_else(|| LoggingError::InvalidLevel(level.to_string()))?;

        if let Some(handle) = &self.handle {
            handle
                .reload(EnvFilter::new(directive))
                .map_err(|e| LoggingError::Reload(e.to_string()))?;
        }
        *self.current.write().unwrap() = level.to_string();

        tracing::info!(level, directive, "Log level changed");
        Ok(())
    }
}

/// Initialize the global tracing subscriber and return the level handle.
pub fn init_logging(level: &str) -> LogLevelHandle {
    let directive = tracing_directive(level).unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    LogLevelHandle {
        current: Arc::new(RwLock::new(level.to_string())),
        handle: Some(handle),
    }
}

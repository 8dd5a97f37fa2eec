//! Administrative configuration service library.

pub mod admin;
pub mod archive;
pub mod backup;
pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;

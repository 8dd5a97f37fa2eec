//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request ID)
//!     → admin router (auth gate → handlers)
//!     → error.rs (failure → status + JSON body)
//!     → Send to client
//! ```

pub mod error;
pub mod server;

pub use error::AdminError;
pub use server::{AppState, HttpServer};

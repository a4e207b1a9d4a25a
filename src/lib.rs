//! Folio Backend Library
//!
//! Portfolio content API plus the operator admin surface. Exposed as a
//! library so the binary and integration tests share one router.

pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod middleware;

pub use api::{create_router, AppState};
pub use config::Config;

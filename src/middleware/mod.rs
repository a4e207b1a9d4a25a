//! Middleware for observability and abuse protection.
//!
//! This module provides:
//! - Request logging with latency tracking
//! - Per-IP limiting of password attempts

pub mod logging;
pub mod rate_limit;

pub use logging::request_logging;
pub use rate_limit::{limit_attempts, AttemptLimitConfig, AttemptLimiter};

//! Tracing/logging setup shared by the service binary and tests.

/// Tracing configuration (formats, filters).
pub mod tracing;

pub use self::tracing::{init, LogFormat};

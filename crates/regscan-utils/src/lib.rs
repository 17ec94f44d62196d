//! # regscan Utilities
//!
//! Shared utilities and logging for regscan.
//!
//! This crate keeps the ambient plumbing out of the tracer itself: today that
//! is the `tracing` subscriber setup used by the command-line tool.

pub mod logging;

// Re-export commonly used logging items for convenience
pub use logging::{build_filter, init_logging, LogFormat, LogLevel, LoggingConfig, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};

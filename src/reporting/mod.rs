//! Diagnostics
//!
//! Structured logging to stderr; matches are never written here.

pub mod logging;

// Re-export commonly used items
pub use logging::{init_logger, level_for};

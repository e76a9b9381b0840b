//! linkscout - extract URLs, paths and endpoints from files, directories and live pages
//!
//! Text from every source runs through one extraction rule. For live pages a
//! headless browser is driven and every sub-resource it loads is fed back
//! through the same rule.

// Core modules
pub mod core;

// Feature modules
pub mod browser;
pub mod config;
pub mod discovery;
pub mod pipeline;
pub mod reporting;
pub mod ui;

// Re-export commonly used types for convenience
pub use crate::core::{ContentPayload, LinkScoutError, MatchSet, Provenance, Result, SharedMatchSet};
pub use crate::discovery::extract;
pub use crate::pipeline::{InputMode, Orchestrator, RunOutcome, RunSummary};

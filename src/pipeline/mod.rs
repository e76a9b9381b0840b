//! Run orchestration
//!
//! Picks the acquisition mode, drives it to completion and merges every
//! source's matches into one run-wide set.

pub mod aggregator;
pub mod orchestrator;

// Re-export commonly used items
pub use aggregator::Aggregator;
pub use orchestrator::{InputMode, Orchestrator, RunOutcome, RunSummary};

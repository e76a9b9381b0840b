//! Content discovery
//!
//! This module turns files and directories into text payloads and
//! runs the extraction rule over them.

pub mod matcher;
pub mod source;

// Re-export commonly used items
pub use matcher::{LinkShape, extract, extract_payload};
pub use source::{DirectoryPayloads, SourceEntry, read_directory, read_file, read_url_list};

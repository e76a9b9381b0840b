/// Application-wide constants to avoid magic values throughout the codebase.
///
/// This module centralizes all magic strings, numbers, and other literal values
/// used across the application, making them easier to maintain and modify.
/// Output format constants
pub mod output_formats {
    /// Text output format - one match per line
    pub const TEXT: &str = "text";
    /// JSON output format - match count, source summary and matches in one object
    pub const JSON: &str = "json";

    /// Default output format
    pub const DEFAULT: &str = TEXT;

    /// All valid output formats
    pub const ALL: [&str; 2] = [TEXT, JSON];
}

/// Timeout and duration constants
pub mod timeouts {
    /// Default page load timeout in seconds
    pub const DEFAULT_PAGE_LOAD_SECONDS: u64 = 30;
    /// Maximum reasonable page load timeout in seconds (1 hour)
    pub const MAX_PAGE_LOAD_SECONDS: u64 = 3600;
    /// Default timeout for loading a single intercepted response body in milliseconds
    pub const DEFAULT_RESPONSE_MS: u64 = 10_000;
    /// Default time in-flight interceptions get to finish after the page is done
    pub const DEFAULT_DRAIN_MS: u64 = 2_000;
}

/// Default configuration values
pub mod defaults {
    /// URLs from a list are crawled one at a time unless asked otherwise
    pub const CONCURRENCY: usize = 1;
    /// Upper bound on parallel browser sessions
    pub const MAX_CONCURRENCY: usize = 64;
    /// Browsers run headless by default
    pub const HEADLESS: bool = true;
    /// Config file looked up in the working directory and its parents
    pub const CONFIG_FILE_NAME: &str = ".linkscout.toml";
    /// How many parent directories are searched for a config file
    pub const CONFIG_SEARCH_DEPTH: usize = 3;
}

/// Resource classification names as accepted on the command line and in config files
pub mod resources {
    /// Resource kinds that are failed before they reach the network
    pub const DEFAULT_BLOCKED: [&str; 3] = ["font", "media", "image"];
    /// Page the interceptor is installed on before navigating
    pub const BLANK_PAGE: &str = "about:blank";
    /// Capacity of the channel carrying intercepted requests to the interceptor task
    pub const EVENT_CHANNEL_CAPACITY: usize = 256;
}

/// File processing constants
pub mod files {
    /// Default capacity hint for matches per payload
    pub const DEFAULT_MATCH_CAPACITY: usize = 32;
    /// Prefix marking a comment line in URL list files
    pub const URL_LIST_COMMENT: &str = "#";
}

//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::browser::interceptor::InterceptorSettings;
use crate::browser::resource::BlockPolicy;
use crate::browser::session::BrowserSettings;
use crate::core::constants::{defaults, output_formats, timeouts};
use crate::core::error::{LinkScoutError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Seconds to wait for a page to finish loading
    pub page_load_timeout: Option<u64>,

    /// Milliseconds to wait for a single intercepted response body
    pub response_timeout_ms: Option<u64>,

    /// Milliseconds to let in-flight interceptions finish after the page loaded
    pub drain_timeout_ms: Option<u64>,

    /// Number of URLs from a list crawled at once
    pub concurrency: Option<usize>,

    /// Chrome/Chromium executable, auto-detected when unset
    pub chrome_path: Option<String>,

    /// Run the browser without a window
    pub headless: Option<bool>,

    /// Resource types failed at request time (font, media, image, ...)
    pub blocked_resources: Option<Vec<String>>,

    /// Output format (text, json)
    pub output_format: Option<String>,

    /// Sort matches before writing them
    pub sort_output: Option<bool>,

    /// Enable verbose logging
    pub verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_load_timeout: Some(timeouts::DEFAULT_PAGE_LOAD_SECONDS),
            response_timeout_ms: Some(timeouts::DEFAULT_RESPONSE_MS),
            drain_timeout_ms: Some(timeouts::DEFAULT_DRAIN_MS),
            concurrency: Some(defaults::CONCURRENCY),
            chrome_path: None,
            headless: Some(defaults::HEADLESS),
            blocked_resources: Some(BlockPolicy::default_names()),
            output_format: Some(output_formats::DEFAULT.to_string()),
            sort_output: Some(false),
            verbose: Some(false),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LinkScoutError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            LinkScoutError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Look for a config file in `start` and its parents.
    ///
    /// A missing file falls back to defaults; a file that exists but is
    /// invalid is an error.
    pub fn load_from_standard_locations(start: &Path) -> Result<Self> {
        match Self::find_in_ancestors(start) {
            Some(path) => {
                log::debug!("Using config file {}", path.display());
                Self::load_from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    fn find_in_ancestors(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .take(defaults::CONFIG_SEARCH_DEPTH + 1)
            .map(|dir| dir.join(defaults::CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Resolve the configuration for a run from the CLI's config flags.
    pub fn load(cli_config: &CliConfig) -> Result<Self> {
        if cli_config.no_config {
            return Ok(Self::default());
        }
        match cli_config.config_file {
            Some(ref path) => Self::load_from_file(path),
            None => {
                let cwd = std::env::current_dir()
                    .map_err(|e| LinkScoutError::io(".", e))?;
                Self::load_from_standard_locations(&cwd)
            }
        }
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Browser
        if let Some(timeout) = cli_config.page_load_timeout {
            self.page_load_timeout = Some(timeout);
        }
        if let Some(ref chrome_path) = cli_config.chrome_path {
            self.chrome_path = Some(chrome_path.clone());
        }
        if cli_config.headful {
            self.headless = Some(false);
        }
        if let Some(ref blocked) = cli_config.blocked_resources {
            self.blocked_resources = Some(blocked.clone());
        }

        // Performance & behavior
        if let Some(concurrency) = cli_config.concurrency {
            self.concurrency = Some(concurrency);
        }

        // Output & format
        if cli_config.verbose {
            self.verbose = Some(true);
        }
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
        if cli_config.sort_output {
            self.sort_output = Some(true);
        }
    }

    pub fn page_load_timeout_duration(&self) -> Duration {
        Duration::from_secs(
            self.page_load_timeout
                .unwrap_or(timeouts::DEFAULT_PAGE_LOAD_SECONDS),
        )
    }

    pub fn response_timeout_duration(&self) -> Duration {
        Duration::from_millis(
            self.response_timeout_ms
                .unwrap_or(timeouts::DEFAULT_RESPONSE_MS),
        )
    }

    pub fn drain_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms.unwrap_or(timeouts::DEFAULT_DRAIN_MS))
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(defaults::CONCURRENCY)
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(output_formats::DEFAULT)
    }

    pub fn block_policy(&self) -> Result<BlockPolicy> {
        match self.blocked_resources {
            Some(ref names) => BlockPolicy::from_names(names),
            None => Ok(BlockPolicy::default()),
        }
    }

    /// Browser launch and interception settings derived from this config.
    pub fn browser_settings(&self) -> Result<BrowserSettings> {
        Ok(BrowserSettings {
            headless: self.headless.unwrap_or(defaults::HEADLESS),
            chrome_path: self.chrome_path.as_ref().map(PathBuf::from),
            page_load_timeout: self.page_load_timeout_duration(),
            interceptor: InterceptorSettings {
                policy: self.block_policy()?,
                response_timeout: self.response_timeout_duration(),
                drain_timeout: self.drain_timeout_duration(),
            },
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.page_load_timeout {
            if timeout == 0 {
                return Err(LinkScoutError::Config(
                    "Page load timeout cannot be 0. Expected a positive integer representing seconds."
                        .to_string(),
                ));
            }
            if timeout > timeouts::MAX_PAGE_LOAD_SECONDS {
                return Err(LinkScoutError::Config(format!(
                    "Page load timeout of {timeout} seconds is too large. Expected at most {}.",
                    timeouts::MAX_PAGE_LOAD_SECONDS
                )));
            }
        }

        if self.response_timeout_ms == Some(0) {
            return Err(LinkScoutError::Config(
                "Response timeout cannot be 0. Expected a positive integer representing milliseconds."
                    .to_string(),
            ));
        }

        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err(LinkScoutError::Config(
                    "Concurrency cannot be 0. Expected a positive integer.".to_string(),
                ));
            }
            if concurrency > defaults::MAX_CONCURRENCY {
                return Err(LinkScoutError::Config(format!(
                    "Concurrency of {concurrency} would start too many browsers at once. Expected at most {}.",
                    defaults::MAX_CONCURRENCY
                )));
            }
        }

        if let Some(ref format) = self.output_format
            && !output_formats::ALL.contains(&format.as_str())
        {
            return Err(LinkScoutError::Config(format!(
                "Invalid output format '{format}'. Expected one of: {}.",
                output_formats::ALL.join(", ")
            )));
        }

        if let Some(ref path) = self.chrome_path
            && path.trim().is_empty()
        {
            return Err(LinkScoutError::Config(
                "Chrome path cannot be empty.".to_string(),
            ));
        }

        if let Err(LinkScoutError::InvalidArgument(msg)) = self.block_policy() {
            return Err(LinkScoutError::Config(msg));
        }

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Browser
    pub page_load_timeout: Option<u64>,          // --timeout
    pub chrome_path: Option<String>,             // --chrome
    pub headful: bool,                           // --headful
    pub blocked_resources: Option<Vec<String>>, // --block

    // Performance & behavior
    pub concurrency: Option<usize>, // --concurrency

    // Output & format
    pub quiet: bool,                   // --quiet
    pub verbose: bool,                 // --verbose
    pub output_format: Option<String>, // --format
    pub sort_output: bool,             // --sort
    pub no_progress: bool,             // --no-progress

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}

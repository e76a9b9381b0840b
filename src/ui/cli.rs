// Command-line interface definitions and parsing for linkscout

use crate::config::CliConfig;
use crate::core::constants::{defaults, output_formats, timeouts};
use crate::core::error::{LinkScoutError, Result};
use crate::pipeline::InputMode;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, subcommand_negates_reqs = true)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["file", "dir", "url", "list"])
))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // Input (exactly one)
    /// Extract from a single file
    #[arg(short = 'f', long, value_name = "PATH", help_heading = "Input")]
    pub file: Option<PathBuf>,

    /// Extract from every file below a directory
    #[arg(short = 'd', long, value_name = "PATH", help_heading = "Input")]
    pub dir: Option<PathBuf>,

    /// Render a page and extract from it and everything it loads
    #[arg(short = 'u', long, value_name = "URL", help_heading = "Input")]
    pub url: Option<String>,

    /// Render every URL in a newline-delimited list
    #[arg(short = 'l', long, value_name = "PATH", help_heading = "Input")]
    pub list: Option<PathBuf>,

    // Browser
    /// Page load timeout in seconds (default: 30)
    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        help_heading = "Browser"
    )]
    pub timeout: Option<u64>,

    /// URLs from a list crawled at once (default: 1)
    #[arg(long, value_name = "COUNT", help_heading = "Browser")]
    pub concurrency: Option<usize>,

    /// Chrome/Chromium executable (default: auto-detect)
    #[arg(long, value_name = "PATH", help_heading = "Browser")]
    pub chrome: Option<String>,

    /// Show the browser window
    #[arg(long, help_heading = "Browser")]
    pub headful: bool,

    /// Resource types to block, comma-separated, or "none" (default: font,media,image)
    #[arg(long, value_name = "KINDS", help_heading = "Browser")]
    pub block: Option<String>,

    // Output & Verbosity
    /// Write matches to a file instead of stdout
    #[arg(short = 'o', long, value_name = "PATH", help_heading = "Output & Verbosity")]
    pub output: Option<PathBuf>,

    /// Output format (default: text)
    #[arg(long, value_name = "FORMAT", value_parser = output_formats::ALL, help_heading = "Output & Verbosity")]
    pub format: Option<String>,

    /// Sort matches before writing them
    #[arg(long, help_heading = "Output & Verbosity")]
    pub sort: bool,

    /// Only print matches
    #[arg(short = 'q', long, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Disable progress bars
    #[arg(long, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completions
    #[command(name = "completion-generate", arg_required_else_help = true)]
    CompletionGenerate {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    /// The input selector that was given, if any.
    pub fn input_mode(&self) -> Option<InputMode> {
        if let Some(ref path) = self.file {
            Some(InputMode::File(path.clone()))
        } else if let Some(ref path) = self.dir {
            Some(InputMode::Directory(path.clone()))
        } else if let Some(ref url) = self.url {
            Some(InputMode::Url(url.clone()))
        } else {
            self.list.clone().map(InputMode::UrlList)
        }
    }
}

/// Parse a `--block` value. `none` and an empty value block nothing.
pub fn parse_block_list(value: &str) -> Vec<String> {
    if value.trim().eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert derive-based CLI arguments to a CliConfig, rejecting out-of-range values
pub fn cli_to_config(cli: &Cli) -> Result<CliConfig> {
    let mut cli_config = CliConfig::default();

    // Browser
    if let Some(timeout) = cli.timeout {
        if timeout == 0 {
            return Err(LinkScoutError::InvalidArgument(
                "Timeout cannot be 0. Expected a positive integer representing seconds."
                    .to_string(),
            ));
        }
        if timeout > timeouts::MAX_PAGE_LOAD_SECONDS {
            return Err(LinkScoutError::InvalidArgument(format!(
                "Timeout of {timeout} seconds is too large. Expected at most {}.",
                timeouts::MAX_PAGE_LOAD_SECONDS
            )));
        }
        cli_config.page_load_timeout = Some(timeout);
    }

    if let Some(ref chrome) = cli.chrome {
        cli_config.chrome_path = Some(chrome.clone());
    }
    cli_config.headful = cli.headful;

    if let Some(ref block) = cli.block {
        cli_config.blocked_resources = Some(parse_block_list(block));
    }

    // Performance & behavior
    if let Some(concurrency) = cli.concurrency {
        if concurrency == 0 || concurrency > defaults::MAX_CONCURRENCY {
            return Err(LinkScoutError::InvalidArgument(format!(
                "Concurrency must be between 1 and {}, got {concurrency}.",
                defaults::MAX_CONCURRENCY
            )));
        }
        cli_config.concurrency = Some(concurrency);
    }

    // Output & format
    cli_config.quiet = cli.quiet;
    cli_config.verbose = cli.verbose;
    cli_config.no_progress = cli.no_progress;
    cli_config.sort_output = cli.sort;
    cli_config.output_format = cli.format.clone();

    // Configuration
    cli_config.config_file = cli.config.clone();
    cli_config.no_config = cli.no_config;

    Ok(cli_config)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("linkscout").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_input_mode__each_selector() {
        assert_eq!(
            parse(&["-f", "app.js"]).unwrap().input_mode(),
            Some(InputMode::File(PathBuf::from("app.js")))
        );
        assert_eq!(
            parse(&["--dir", "site"]).unwrap().input_mode(),
            Some(InputMode::Directory(PathBuf::from("site")))
        );
        assert_eq!(
            parse(&["-u", "https://example.com"]).unwrap().input_mode(),
            Some(InputMode::Url("https://example.com".to_string()))
        );
        assert_eq!(
            parse(&["-l", "urls.txt"]).unwrap().input_mode(),
            Some(InputMode::UrlList(PathBuf::from("urls.txt")))
        );
    }

    #[test]
    fn test_parse__no_selector_is_usage_error() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse__two_selectors_conflict() {
        let err = parse(&["-f", "a.js", "-d", "site"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_parse__subcommand_needs_no_selector() {
        let cli = parse(&["completion-generate", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::CompletionGenerate {
                shell: clap_complete::Shell::Bash
            })
        ));
        assert_eq!(cli.input_mode(), None);
    }

    #[test]
    fn test_parse__invalid_format() {
        assert!(parse(&["-f", "a.js", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_parse_block_list() {
        assert_eq!(parse_block_list("font, image"), vec!["font", "image"]);
        assert_eq!(parse_block_list("none"), Vec::<String>::new());
        assert_eq!(parse_block_list(""), Vec::<String>::new());
        assert_eq!(parse_block_list("media,,"), vec!["media"]);
    }

    #[test]
    fn test_cli_to_config() {
        let cli = parse(&[
            "-u",
            "https://example.com",
            "--timeout",
            "12",
            "--concurrency",
            "3",
            "--chrome",
            "/opt/chrome",
            "--headful",
            "--block",
            "image",
            "--format",
            "json",
            "--sort",
            "-v",
            "--no-config",
        ])
        .unwrap();

        let config = cli_to_config(&cli).unwrap();

        assert_eq!(config.page_load_timeout, Some(12));
        assert_eq!(config.concurrency, Some(3));
        assert_eq!(config.chrome_path, Some("/opt/chrome".to_string()));
        assert!(config.headful);
        assert_eq!(config.blocked_resources, Some(vec!["image".to_string()]));
        assert_eq!(config.output_format, Some("json".to_string()));
        assert!(config.sort_output);
        assert!(config.verbose);
        assert!(config.no_config);
    }

    #[test]
    fn test_cli_to_config__defaults_leave_config_untouched() {
        let cli = parse(&["-f", "a.js"]).unwrap();
        let config = cli_to_config(&cli).unwrap();

        assert_eq!(config.page_load_timeout, None);
        assert_eq!(config.concurrency, None);
        assert_eq!(config.blocked_resources, None);
        assert_eq!(config.output_format, None);
        assert!(!config.headful);
    }

    #[test]
    fn test_cli_to_config__rejects_zero_timeout() {
        let cli = parse(&["-f", "a.js", "--timeout", "0"]).unwrap();
        assert!(matches!(
            cli_to_config(&cli),
            Err(LinkScoutError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_cli_to_config__rejects_out_of_range_concurrency() {
        let cli = parse(&["-l", "urls.txt", "--concurrency", "0"]).unwrap();
        assert!(cli_to_config(&cli).is_err());

        let too_many = (defaults::MAX_CONCURRENCY + 1).to_string();
        let cli = parse(&["-l", "urls.txt", "--concurrency", &too_many]).unwrap();
        assert!(cli_to_config(&cli).is_err());
    }
}

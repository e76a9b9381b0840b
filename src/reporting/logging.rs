use crate::config::Config;
use crate::pipeline::{InputMode, RunSummary};
use log::{LevelFilter, debug, info, warn};

/// Level used for a given combination of `-v` and `-q`.
///
/// Warnings stay visible by default so skipped files and failed resources
/// are reported on stderr.
pub fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Off
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Initialize the logger with appropriate level based on verbosity.
///
/// `RUST_LOG` refines the level unless `quiet` is set.
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = level_for(verbose, quiet);

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);
    if !quiet {
        builder.parse_default_env();
    }
    // A second initialization (tests, embedding) keeps the first logger.
    if builder.try_init().is_ok() {
        debug!("Logger initialized with level: {level:?}");
    }
}

/// Log configuration information
pub fn log_config_info(config: &Config) {
    let blocked = config
        .blocked_resources
        .as_ref()
        .map(|names| names.join(","))
        .unwrap_or_default();

    info!(
        "Configuration: concurrency={}, page_load_timeout={}s, response_timeout={}ms, drain_timeout={}ms",
        config.concurrency(),
        config.page_load_timeout_duration().as_secs(),
        config.response_timeout_duration().as_millis(),
        config.drain_timeout_duration().as_millis()
    );
    info!(
        "Browser: headless={}, chrome={}, blocked=[{blocked}]",
        config.headless.unwrap_or(true),
        config.chrome_path.as_deref().unwrap_or("auto")
    );
}

/// Log the start of a run
pub fn log_run_start(mode: &InputMode) {
    info!("Starting run over {mode}");
}

/// Log run completion
pub fn log_run_complete(summary: &RunSummary, match_count: usize, duration_ms: u128) {
    if summary.skipped == 0 {
        info!(
            "✅ Run complete: {match_count} unique match(es) from {} source(s) ({duration_ms}ms)",
            summary.processed
        );
    } else {
        warn!(
            "Run complete: {match_count} unique match(es) from {} source(s), {} skipped ({duration_ms}ms)",
            summary.processed, summary.skipped
        );
    }
}

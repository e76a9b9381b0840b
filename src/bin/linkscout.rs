use clap::Parser;
use linkscout::browser::BrowserCrawler;
use linkscout::config::{CliConfig, Config};
use linkscout::pipeline::Orchestrator;
use linkscout::reporting::logging;
use linkscout::ui::completion::print_completions;
use linkscout::ui::output;
use linkscout::ui::{Cli, Commands, ProgressReporter, cli_to_config};

use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle completion commands first
    if let Some(exit_code) = handle_completion_commands(&cli) {
        std::process::exit(exit_code);
    }

    match run_linkscout_logic(&cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Handle completion commands and return exit code if a completion command was processed
pub fn handle_completion_commands(cli: &Cli) -> Option<i32> {
    match cli.command {
        Some(Commands::CompletionGenerate { shell }) => {
            print_completions(shell);
            Some(0)
        }
        None => None,
    }
}

/// Main extraction logic extracted from main() for testing
pub async fn run_linkscout_logic(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cli_config = cli_to_config(cli)?;
    let config = load_and_merge_config(&cli_config)?;

    logging::init_logger(config.verbose.unwrap_or(false), cli_config.quiet);
    logging::log_config_info(&config);

    // clap's required group guarantees a selector outside of subcommands
    let mode = cli
        .input_mode()
        .ok_or("Expected one of --file, --dir, --url or --list")?;
    logging::log_run_start(&mode);

    let mut orchestrator = build_orchestrator(&config, &cli_config)?;

    let started = Instant::now();
    let outcome = orchestrator.run(mode).await?;
    logging::log_run_complete(
        &outcome.summary,
        outcome.matches.len(),
        started.elapsed().as_millis(),
    );

    output::write_matches(
        &outcome.matches,
        &outcome.summary,
        config.output_format(),
        config.sort_output.unwrap_or(false),
        cli.output.as_deref(),
    )?;

    Ok(())
}

/// Load configuration from file or standard locations and merge with CLI config
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = Config::load(cli_config)?;

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    config.validate()?;
    Ok(config)
}

/// Wire the crawler and progress display for this run.
pub fn build_orchestrator(
    config: &Config,
    cli_config: &CliConfig,
) -> Result<Orchestrator, Box<dyn std::error::Error>> {
    let settings = config.browser_settings()?;
    let show_progress = !cli_config.quiet && !cli_config.no_progress;

    Ok(Orchestrator::new(Arc::new(BrowserCrawler::new(settings)))
        .with_concurrency(config.concurrency())
        .with_progress(ProgressReporter::new(show_progress)))
}

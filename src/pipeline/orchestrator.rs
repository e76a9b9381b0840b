use futures::{StreamExt, stream};
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::aggregator::Aggregator;
use crate::browser::session::{BrowserCrawler, Crawler};
use crate::core::constants::defaults;
use crate::core::error::{LinkScoutError, Result};
use crate::core::types::MatchSet;
use crate::discovery::matcher;
use crate::discovery::source::{self, SourceEntry};
use crate::ui::progress::ProgressReporter;

/// The one acquisition mode a run works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    File(PathBuf),
    Directory(PathBuf),
    Url(String),
    UrlList(PathBuf),
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::File(path) => write!(f, "file {}", path.display()),
            InputMode::Directory(path) => write!(f, "directory {}", path.display()),
            InputMode::Url(url) => write!(f, "URL {url}"),
            InputMode::UrlList(path) => write!(f, "URL list {}", path.display()),
        }
    }
}

/// Counts of sources handled during a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record<T>(&mut self, outcome: &std::result::Result<T, LinkScoutError>) {
        match outcome {
            Ok(_) => self.processed += 1,
            Err(_) => self.skipped += 1,
        }
    }
}

/// Final result of a run.
#[derive(Debug)]
pub struct RunOutcome {
    pub matches: MatchSet,
    pub summary: RunSummary,
}

/// Drives one input mode to completion and collects every match.
pub struct Orchestrator {
    crawler: Arc<dyn Crawler>,
    concurrency: usize,
    progress: ProgressReporter,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Arc::new(BrowserCrawler::default()))
    }
}

impl Orchestrator {
    pub fn new(crawler: Arc<dyn Crawler>) -> Self {
        Self {
            crawler,
            concurrency: defaults::CONCURRENCY,
            progress: ProgressReporter::new(false),
        }
    }

    /// Crawl up to `concurrency` URLs of a list at once, each in its own session.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub async fn run(&mut self, mode: InputMode) -> Result<RunOutcome> {
        info!("Processing {mode}");
        let aggregator = Aggregator::new();

        let summary = match mode {
            InputMode::File(ref path) => self.run_file(path, &aggregator)?,
            InputMode::Directory(ref root) => self.run_directory(root, &aggregator)?,
            InputMode::Url(ref url) => self.run_url(url, &aggregator).await?,
            InputMode::UrlList(ref path) => self.run_url_list(path, &aggregator).await?,
        };

        self.progress
            .finish_sources(summary.processed, summary.skipped);
        self.progress.finish_and_clear();

        debug!(
            "Found {} unique match(es) in {} source(s), {} skipped",
            aggregator.len(),
            summary.processed,
            summary.skipped
        );

        Ok(RunOutcome {
            matches: aggregator.finish(),
            summary,
        })
    }

    fn run_file(&mut self, path: &Path, aggregator: &Aggregator) -> Result<RunSummary> {
        let payload = source::read_file(path)?;
        aggregator.merge(matcher::extract_payload(payload));

        Ok(RunSummary {
            processed: 1,
            skipped: 0,
        })
    }

    fn run_directory(&mut self, root: &Path, aggregator: &Aggregator) -> Result<RunSummary> {
        let entries = source::read_directory(root)?;
        self.progress.start_sources(None, "files");
        self.consume_entries(entries, aggregator)
    }

    /// Merge every loaded file; unreadable files are skipped, a failed walk aborts.
    fn consume_entries<I>(&mut self, entries: I, aggregator: &Aggregator) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<SourceEntry>>,
    {
        let mut summary = RunSummary::default();
        for entry in entries {
            match entry {
                Ok(SourceEntry::Loaded(payload)) => {
                    let label = payload.provenance().to_string();
                    aggregator.merge(matcher::extract_payload(payload));
                    summary.processed += 1;
                    self.progress.advance(&label);
                }
                Ok(SourceEntry::Unreadable { path, error }) => {
                    warn!("Skipping {}: {error}", path.display());
                    summary.skipped += 1;
                }
                Err(err) if err.is_recoverable() => {
                    warn!("Skipping directory entry: {err}");
                    summary.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(summary)
    }

    async fn run_url(&mut self, url: &str, aggregator: &Aggregator) -> Result<RunSummary> {
        let spinner = self.progress.create_spinner(&format!("Crawling {url}"));
        let outcome = self.crawler.crawl(url, aggregator.shared()).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        let mut summary = RunSummary::default();
        summary.record(&outcome);
        match outcome {
            Ok(()) => Ok(summary),
            // Without a browser there is nothing to fall back on.
            Err(err @ LinkScoutError::BrowserLaunch(_)) => Err(err),
            Err(err) => {
                warn!("{err}");
                Ok(summary)
            }
        }
    }

    async fn run_url_list(&mut self, path: &Path, aggregator: &Aggregator) -> Result<RunSummary> {
        let urls = source::read_url_list(path)?;
        self.progress.start_sources(Some(urls.len()), "URLs");
        debug!(
            "Crawling {} URL(s), {} at a time",
            urls.len(),
            self.concurrency
        );

        let crawler = &self.crawler;
        let shared = aggregator.shared();
        let mut crawls = stream::iter(urls)
            .map(|url| async move {
                let outcome = crawler.crawl(&url, shared).await;
                (url, outcome)
            })
            .buffer_unordered(self.concurrency);

        let mut summary = RunSummary::default();
        while let Some((url, outcome)) = crawls.next().await {
            summary.record(&outcome);
            match outcome {
                Err(err) if !err.is_recoverable() => return Err(err),
                Err(err) => warn!("Skipping {url}: {err}"),
                Ok(()) => {}
            }
            self.progress.advance(&url);
        }

        Ok(summary)
    }
}

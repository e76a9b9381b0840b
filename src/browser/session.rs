use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::interceptor::{InterceptorSettings, TrafficInterceptor};
use crate::core::constants::{defaults, resources, timeouts};
use crate::core::error::{LinkScoutError, Result};
use crate::core::types::{ContentPayload, SharedMatchSet};
use crate::discovery::matcher;

/// How browser sessions are launched and how long they may take.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub page_load_timeout: Duration,
    pub interceptor: InterceptorSettings,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: defaults::HEADLESS,
            chrome_path: None,
            page_load_timeout: Duration::from_secs(timeouts::DEFAULT_PAGE_LOAD_SECONDS),
            interceptor: InterceptorSettings::default(),
        }
    }
}

/// One headless browser process.
///
/// Sessions are not shared between URLs; [`BrowserSession::close`] must be
/// called on every exit path.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a browser process.
    pub async fn open(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(ref path) = settings.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| LinkScoutError::BrowserLaunch(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| LinkScoutError::BrowserLaunch(format!("failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!("Browser handler: {err}");
                }
            }
        });

        debug!("Browser session opened");
        Ok(Self { browser, handler })
    }

    /// Open a blank page, ready for interception to be installed.
    pub async fn new_page(&self) -> Result<Page> {
        self.browser
            .new_page(resources::BLANK_PAGE)
            .await
            .map_err(|e| LinkScoutError::Browser(format!("failed to create page: {e}")))
    }

    /// Render `url` with interception running and merge everything found.
    ///
    /// Matches from sub-resources are merged as they arrive, so they survive
    /// even when the page itself fails to load.
    pub async fn capture(
        &self,
        url: &str,
        settings: &BrowserSettings,
        matches: &SharedMatchSet,
    ) -> Result<()> {
        let page = self
            .new_page()
            .await
            .map_err(|err| LinkScoutError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        let interceptor =
            TrafficInterceptor::install(&page, matches.clone(), settings.interceptor.clone())
                .await?;

        let rendered = render(&page, url, settings.page_load_timeout).await;
        if let Ok(ref html) = rendered {
            matches.merge(matcher::extract_payload(ContentPayload::from_url(
                url,
                html.clone(),
            )));
        }

        let stats = interceptor.stop().await;
        debug!("Interception for {url}: {stats:?}");

        if let Err(err) = page.close().await {
            debug!("Could not close page for {url}: {err}");
        }

        rendered.map(|_| ())
    }

    /// Terminate the browser process and release its resources.
    pub async fn close(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!("Error closing browser: {err}");
        }
        if let Err(err) = self.browser.wait().await {
            debug!("Error waiting for browser exit: {err}");
        }
        self.handler.abort();
        debug!("Browser session closed");
    }
}

/// Navigate and return the rendered HTML, bounded by `timeout`.
async fn render(page: &Page, url: &str, timeout: Duration) -> Result<String> {
    let load = async {
        page.goto(url).await?;
        let html = page.content().await?;
        Ok::<String, CdpError>(html)
    };

    match tokio::time::timeout(timeout, load).await {
        Ok(Ok(html)) => Ok(html),
        Ok(Err(err)) => Err(LinkScoutError::Navigation {
            url: url.to_string(),
            reason: err.to_string(),
        }),
        Err(_) => Err(LinkScoutError::Timeout {
            what: format!("page load of {url}"),
            after: timeout,
        }),
    }
}

/// Open a session for `url`, capture it, and always tear the session down.
pub async fn crawl_url(
    url: &str,
    settings: &BrowserSettings,
    matches: &SharedMatchSet,
) -> Result<()> {
    let session = BrowserSession::open(settings).await?;
    let outcome = session.capture(url, settings, matches).await;
    session.close().await;
    outcome
}

/// Something that can render a URL and merge its matches.
#[async_trait]
pub trait Crawler: Send + Sync {
    async fn crawl(&self, url: &str, matches: &SharedMatchSet) -> Result<()>;
}

/// [`Crawler`] backed by a fresh headless browser per URL.
#[derive(Debug, Clone, Default)]
pub struct BrowserCrawler {
    settings: BrowserSettings,
}

impl BrowserCrawler {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }
}

#[async_trait]
impl Crawler for BrowserCrawler {
    async fn crawl(&self, url: &str, matches: &SharedMatchSet) -> Result<()> {
        info!("Crawling {url}");
        let before = matches.len();
        let outcome = crawl_url(url, &self.settings, matches).await;
        debug!("{url} added {} new match(es)", matches.len().saturating_sub(before));
        outcome
    }
}

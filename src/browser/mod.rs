//! Headless browser capture
//!
//! Launches a browser per URL, intercepts its network traffic and feeds
//! every response body through the extraction rule.

pub mod interceptor;
pub mod resource;
pub mod session;

// Re-export commonly used items
pub use interceptor::{InterceptorSettings, InterceptorStats, TrafficInterceptor};
pub use resource::{BlockPolicy, ResourceClass};
pub use session::{BrowserCrawler, BrowserSession, BrowserSettings, Crawler, crawl_url};

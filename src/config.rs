// src/config.rs
// =============================================================================
// Tunables for a crawl.
//
// None of these change which pages end up in the sitemap; they only control
// how hard we hit the server and how long we wait for it.
// =============================================================================

use std::time::Duration;

/// How many metadata (HEAD) requests may be in flight at once by default
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Per-request timeout used unless the caller disables it
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for a single crawl
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Ceiling on simultaneous metadata fetches for one page's links
    pub concurrency: usize,

    /// Timeout applied to every GET/HEAD request; None waits forever
    pub request_timeout: Option<Duration>,

    /// User-Agent header; None sends reqwest's default (no custom header)
    pub user_agent: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            user_agent: None,
        }
    }
}

impl CrawlConfig {
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::new()
    }
}

/// Builder for CrawlConfig
#[derive(Debug, Default)]
pub struct CrawlConfigBuilder {
    config: CrawlConfig,
}

impl CrawlConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CrawlConfig::default(),
        }
    }

    /// Set the concurrency ceiling (0 is treated as 1)
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency.max(1);
        self
    }

    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> CrawlConfig {
        self.config
    }
}

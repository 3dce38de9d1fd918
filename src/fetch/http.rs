// src/fetch/http.rs
// =============================================================================
// This module talks to the website over HTTP.
//
// Two requests are made:
// - GET a page and hand its body to the HTML link extractor
// - HEAD a link and read its Last-Modified header (no body download)
//
// Every request is attempted exactly once. There are no retries and no
// fallbacks; the crawler decides what a failure means.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::LAST_MODIFIED;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use tracing::debug;

use super::html::extract_html_links;
use super::PageFetcher;
use crate::config::CrawlConfig;
use crate::error::{ExtractError, FetchError};

/// Fetcher backed by two reqwest clients: one for page GETs, one for HEADs.
///
/// Cloning is cheap: each client is reference counted internally and all
/// clones share its connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    head_client: Client,
}

impl HttpFetcher {
    // Builds the clients from the crawl configuration
    //
    // Page GETs follow redirects (up to reqwest's default of 10), so a moved
    // page is scanned at its final address. HEAD requests do not: the
    // Last-Modified recorded for a link is the one the link itself answers
    // with, and a redirect to a dead host still counts as an answer.
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let client = client_builder(config).build().map_err(FetchError::Client)?;
        let head_client = client_builder(config)
            .redirect(Policy::none())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, head_client })
    }

    // Fetches a web page and returns its HTML content
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| request_error(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| request_error(url, source))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn extract_links(&self, url: &str) -> Result<Vec<String>, ExtractError> {
        let html = self.fetch_page(url).await?;
        let links = extract_html_links(&html, url)?;
        debug!("{} link(s) found on {}", links.len(), url);
        Ok(links)
    }

    // Any response counts, whatever its status. Only a request that got no
    // answer at all is an error.
    async fn fetch_last_modified(&self, url: &str) -> Result<Option<String>, FetchError> {
        let response = self
            .head_client
            .head(url)
            .send()
            .await
            .map_err(|source| request_error(url, source))?;

        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(last_modified)
    }
}

fn client_builder(config: &CrawlConfig) -> ClientBuilder {
    let mut builder = Client::builder();

    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }
    builder
}

fn request_error(url: &str, source: reqwest::Error) -> FetchError {
    FetchError::Request {
        url: url.to_string(),
        source,
    }
}

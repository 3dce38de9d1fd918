// src/fetch/mod.rs
// =============================================================================
// This module contains everything that touches the network.
//
// Submodules:
// - html: Extracts and resolves links from an HTML document
// - http: Makes the GET/HEAD requests with reqwest
//
// The crawler only sees the PageFetcher trait below, so it can be driven by
// the real HTTP fetcher or by a scripted one in tests.
// =============================================================================

mod html;
mod http;

use async_trait::async_trait;

use crate::error::{ExtractError, FetchError};

pub use http::HttpFetcher;

/// The two network primitives the crawler is built on.
///
/// Implementations must not keep crawl state: they are called concurrently
/// from spawned tasks and only return results.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// GET `url` and return every anchor href on it as an absolute URL,
    /// in document order, duplicates included.
    async fn extract_links(&self, url: &str) -> Result<Vec<String>, ExtractError>;

    /// HEAD `url` and return its `Last-Modified` header verbatim, or `None`
    /// when the server did not send one.
    async fn fetch_last_modified(&self, url: &str) -> Result<Option<String>, FetchError>;
}

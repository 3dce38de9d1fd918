// src/error.rs
// =============================================================================
// Error types for fetching pages, extracting links and writing the sitemap.
//
// The crawl itself never fails: these errors describe what went wrong with a
// single page or a single link, and the crawler logs them and moves on.
// Only the binary (main.rs) turns an error into a non-zero exit code.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Network-level failure on a GET or HEAD request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, broken body, ...
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The page answered with a non-2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The HTTP client could not be built from the configuration
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The fetched page could not be turned into a list of links.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot resolve links against '{url}': {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure of `extract_links`: either the page could not be fetched or
/// its links could not be extracted.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure while rendering the result set as XML or JSON.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sitemap is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

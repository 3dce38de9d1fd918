// src/fetch/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, which recovers from broken markup the way a
//   browser does, so "malformed HTML" simply yields fewer anchors
//
// We also use the `url` crate to resolve every href against the page URL:
// relative paths, protocol-relative ("//host/x") and absolute URLs all go
// through the same WHATWG resolution rules.
//
// Nothing is filtered or deduplicated here. The crawler decides what to keep.
// =============================================================================

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::ParseError;

// Extracts every anchor href from HTML content, resolved to absolute URLs
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL the HTML was fetched from (base for relative links)
//
// Returns: absolute URLs in document order, duplicates preserved
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   page_url = "https://example.com/page"
//   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, page_url: &str) -> Result<Vec<String>, ParseError> {
    // Without a valid base there is nothing to resolve against
    let base = Url::parse(page_url).map_err(|source| ParseError::InvalidPageUrl {
        url: page_url.to_string(),
        source,
    })?;

    let document = Html::parse_document(html);

    // "a[href]" is a constant, known-valid selector
    let selector = Selector::parse("a[href]").expect("a[href] is a valid selector");

    let links = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_url(&base, href))
        .collect();

    Ok(links)
}

// Resolves a possibly-relative href to an absolute URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs"              -> Some("https://example.com/docs")
//   href = "//cdn.example.com"  -> Some("https://cdn.example.com/")
//   href = "https://other.com"  -> Some("https://other.com/")
//   href = "http://"            -> None (cannot be parsed at all)
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    // Url::join handles absolute hrefs too: they simply replace the base
    match base.join(href.trim()) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!("Skipping unresolvable href '{}' on {}: {}", href, base, e);
            None
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why keep duplicates and fragments?
//    - The extractor reports the page as it is; a page linking to /a twice
//      yields /a twice
//    - "/a#top" and "/a" are different strings and stay different. URL
//      identity in the crawl is purely syntactic
//
// 2. Why keep mailto:, javascript:, ... links?
//    - They resolve to absolute URLs like any other href
//    - They can never start with an http(s) seed, so the crawler's origin
//      filter drops them without a special case here
//
// 3. What does Url::to_string() normalize?
//    - Only what URL serialization always normalizes: lowercase scheme and
//      host, default ports removed, an empty path becomes "/"
// -----------------------------------------------------------------------------

// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a seed URL
// - Only follows URLs that start with the seed (doesn't crawl external sites)
// - Fetches Last-Modified for discovered links with bounded concurrency
// - Keeps going when individual pages or links fail
//
// Rust concepts:
// - Async programming: For concurrent network requests
// - Collections: HashSet for visited URLs, VecDeque for the queue,
//   BTreeMap for the ordered result set
// =============================================================================

mod orchestrator;
mod queue;

pub use orchestrator::{crawl, SitemapSet};

#[cfg(test)]
pub use orchestrator::LinkRecord;

// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use clap::Parser;

use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use crate::sitemap::SITEMAP_FILE_NAME;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug)]
#[command(
    name = "sitemapper",
    version,
    about = "Crawl a website and generate an XML sitemap",
    long_about = "sitemapper crawls every page reachable from a seed URL whose address starts \
                  with that URL, reads each page's Last-Modified header and writes the result \
                  as a sitemaps.org XML file."
)]
pub struct Cli {
    /// Website URL to start from (e.g., https://example.com/)
    ///
    /// Only pages whose URL starts with this URL (as normalized by the url
    /// crate: lowercase host, no default port) are included
    pub seed_url: String,

    /// Where to write the sitemap; "-" writes to stdout
    #[arg(short, long, default_value = SITEMAP_FILE_NAME)]
    pub output: String,

    /// Output the discovered pages as JSON instead of XML
    #[arg(long)]
    pub json: bool,

    /// Maximum number of Last-Modified requests in flight at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds (0 disables the timeout)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// User-Agent header to send with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Log every link decision (same as RUST_LOG=debug)
    #[arg(short, long)]
    pub verbose: bool,
}

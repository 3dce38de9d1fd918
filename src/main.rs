// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so the sitemap can go to stdout)
// 3. Crawl the website starting from the seed URL
// 4. Write the sitemap (XML or JSON) to a file or stdout
// 5. Exit with proper code (0 = sitemap written, 2 = error)
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - crawl tunables
mod crawl;    // src/crawl/ - breadth-first crawl and result set
mod error;    // src/error.rs - error types
mod fetch;    // src/fetch/ - HTTP requests and link extraction
mod sitemap;  // src/sitemap.rs - XML/JSON rendering

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use cli::Cli;
use config::CrawlConfig;
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr; RUST_LOG overrides the level chosen by --verbose
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Returns:
//   Ok(0) = sitemap written (possibly with some pages/links skipped)
//   Err   = bad arguments or the sitemap could not be written
async fn run(cli: Cli) -> Result<i32> {
    let seed_url = canonical_seed(&cli.seed_url)?;
    if seed_url != cli.seed_url {
        info!("Using seed URL {} (normalized from {})", seed_url, cli.seed_url);
    }

    let config = build_config(&cli);
    let fetcher = HttpFetcher::new(&config).context("Failed to set up HTTP client")?;

    let report = crawl::crawl(&seed_url, Arc::new(fetcher), &config).await;

    let document = if cli.json {
        sitemap::render_json(&report.sitemap)?
    } else {
        sitemap::render_xml(&report.sitemap)?
    };
    write_output(&cli.output, &document)?;

    info!(
        "Wrote {} URL(s) to {} ({} page(s) scanned)",
        report.sitemap.len(),
        if cli.output == "-" { "stdout" } else { cli.output.as_str() },
        report.stats.pages_scanned
    );
    if report.sitemap.is_empty() {
        warn!("No pages under {} were found; the sitemap is empty", seed_url);
    }
    if report.stats.extraction_failures > 0 || report.stats.metadata_failures > 0 {
        warn!(
            "{} page(s) could not be scanned, {} link(s) dropped after failed requests",
            report.stats.extraction_failures, report.stats.metadata_failures
        );
    }

    Ok(0)
}

// Discovered links are serialized by the url crate (lowercase host, no
// default port, percent-encoded path), and the seed is the prefix they are
// matched against, so the seed gets the same serialization. Otherwise a seed
// like "https://Example.com:443/" could never match a single link.
fn canonical_seed(seed_url: &str) -> Result<String> {
    let url = Url::parse(seed_url).with_context(|| format!("Invalid seed URL '{}'", seed_url))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("Seed URL must use http or https: {}", seed_url);
    }
    Ok(url.to_string())
}

fn build_config(cli: &Cli) -> CrawlConfig {
    let timeout = match cli.timeout {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let mut builder = CrawlConfig::builder()
        .concurrency(cli.concurrency)
        .request_timeout(timeout);
    if let Some(user_agent) = &cli.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }
    builder.build()
}

fn write_output(path: &str, document: &str) -> Result<()> {
    if path == "-" {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", document).context("Failed to write sitemap to stdout")?;
    } else {
        std::fs::write(path, document).with_context(|| format!("Failed to write {}", path))?;
    }
    Ok(())
}

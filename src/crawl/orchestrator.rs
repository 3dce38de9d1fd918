// src/crawl/orchestrator.rs
// =============================================================================
// This module drives the crawl and builds the sitemap's result set.
//
// How it works:
// 1. Start with the seed URL in the frontier
// 2. Take the next unvisited URL and extract its links
// 3. Keep the links that start with the seed URL and are not recorded yet
// 4. Fetch Last-Modified for those links concurrently (bounded)
// 5. Record every link whose fetch succeeded and queue it for extraction
// 6. Repeat until the frontier is empty
//
// All crawl state (frontier, visited set, result set) is owned by this one
// task. The spawned metadata fetches only return values through the stream;
// they never touch the state themselves, so no locks are needed.
//
// Failures are isolated: a page that cannot be scanned contributes no links,
// a link whose HEAD fails is dropped. The crawl itself always completes.
// =============================================================================

use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use super::queue::Frontier;
use crate::config::CrawlConfig;
use crate::fetch::PageFetcher;

/// One sitemap entry: a page and its Last-Modified header, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub url: String,
    pub last_modified: Option<String>,
}

/// The set of pages discovered by a crawl, keyed by URL.
///
/// The first record for a URL wins; later records for the same URL are
/// ignored, so a URL appears at most once in the sitemap. Iteration is in
/// ascending URL order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapSet {
    records: BTreeMap<String, LinkRecord>,
}

impl SitemapSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns true if the record was added, false if its URL was already present
    pub fn insert(&mut self, record: LinkRecord) -> bool {
        match self.records.entry(record.url.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.records.contains_key(url)
    }

    #[cfg(test)]
    pub fn get(&self, url: &str) -> Option<&LinkRecord> {
        self.records.get(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkRecord> {
        self.records.values()
    }
}

// Serialized as a plain list of records
impl Serialize for SitemapSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.records.values())
    }
}

/// Counters describing how a crawl went
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages handed to the link extractor
    pub pages_scanned: usize,
    /// Pages whose links could not be extracted
    pub extraction_failures: usize,
    /// Links dropped because their metadata fetch failed
    pub metadata_failures: usize,
}

/// What a crawl produced
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub sitemap: SitemapSet,
    pub stats: CrawlStats,
}

// Crawls a website breadth-first starting from `seed_url`
//
// Parameters:
//   seed_url: where to start; also the prefix every recorded URL must have
//   fetcher: network access (GET for links, HEAD for Last-Modified)
//   config: concurrency ceiling for the HEAD requests
//
// The seed itself is only recorded if some page links back to it.
//
// Terminates once every same-origin page reachable from the seed has been
// scanned; each URL is scanned at most once.
pub async fn crawl<F: PageFetcher>(seed_url: &str, fetcher: Arc<F>, config: &CrawlConfig) -> CrawlReport {
    let concurrency = config.concurrency.max(1);
    info!("Crawling {} (up to {} concurrent requests)", seed_url, concurrency);

    let mut frontier = Frontier::new(seed_url);
    let mut sitemap = SitemapSet::new();
    let mut stats = CrawlStats::default();

    while let Some(page_url) = frontier.next_unvisited() {
        info!("Scanning: {}", page_url);
        stats.pages_scanned += 1;

        let links = match fetcher.extract_links(&page_url).await {
            Ok(links) => links,
            Err(e) => {
                warn!("Failed to extract links from {}: {}", page_url, e);
                stats.extraction_failures += 1;
                Vec::new()
            }
        };

        let candidates = select_candidates(seed_url, links, &sitemap);
        if candidates.is_empty() {
            continue;
        }
        debug!("Fetching metadata for {} new link(s) from {}", candidates.len(), page_url);

        // Each fetch runs as its own task; buffer_unordered spawns the next
        // one only when a slot frees up, so at most `concurrency` are alive.
        // Results arrive in completion order, not submission order.
        let mut fetches = stream::iter(candidates)
            .map(|url| {
                let fetcher = Arc::clone(&fetcher);
                async move {
                    let task_url = url.clone();
                    let joined =
                        tokio::spawn(async move { fetcher.fetch_last_modified(&task_url).await }).await;
                    (url, joined)
                }
            })
            .buffer_unordered(concurrency);

        while let Some((url, joined)) = fetches.next().await {
            match joined {
                Ok(Ok(last_modified)) => {
                    let record = LinkRecord {
                        url: url.clone(),
                        last_modified,
                    };
                    if sitemap.insert(record) {
                        frontier.push(url);
                    }
                }
                Ok(Err(e)) => {
                    warn!("Error processing URL {}: {}", url, e);
                    stats.metadata_failures += 1;
                }
                Err(e) => {
                    warn!("Metadata task for {} did not finish: {}", url, e);
                    stats.metadata_failures += 1;
                }
            }
        }
    }

    info!(
        "Crawl of {} finished: {} page(s) scanned, {} URL(s) recorded",
        seed_url,
        frontier.visited_count(),
        sitemap.len()
    );

    CrawlReport { sitemap, stats }
}

// Narrows one page's links down to the ones worth a HEAD request
//
// Dropped:
// - links outside the seed prefix (they could never be recorded)
// - links already in the result set (recording them again is a no-op)
// - repeats of a link earlier on the same page
fn select_candidates(seed_url: &str, links: Vec<String>, sitemap: &SitemapSet) -> Vec<String> {
    let mut seen = HashSet::new();

    links
        .into_iter()
        .filter(|link| {
            if !is_same_origin(seed_url, link) {
                debug!("Dropping off-site link {}", link);
                return false;
            }
            !sitemap.contains(link) && seen.insert(link.clone())
        })
        .collect()
}

// The origin filter: a plain string prefix check against the seed
fn is_same_origin(seed_url: &str, candidate: &str) -> bool {
    candidate.starts_with(seed_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, FetchError};
    use crate::fetch::HttpFetcher;
    use async_trait::async_trait;
    use mockito::Server;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // A fetcher that serves a fixed link graph and records every call.
    // Pages missing from `pages` fail extraction; URLs in `failing_heads`
    // fail their metadata fetch.
    #[derive(Default)]
    struct ScriptedFetcher {
        pages: HashMap<String, Vec<String>>,
        last_modified: HashMap<String, String>,
        failing_heads: HashSet<String>,
        head_delay: Duration,
        extracted: Mutex<Vec<String>>,
        heads: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn page(mut self, url: &str, links: &[&str]) -> Self {
            self.pages
                .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
            self
        }

        fn modified(mut self, url: &str, value: &str) -> Self {
            self.last_modified.insert(url.to_string(), value.to_string());
            self
        }

        fn failing_head(mut self, url: &str) -> Self {
            self.failing_heads.insert(url.to_string());
            self
        }

        fn extracted(&self) -> Vec<String> {
            self.extracted.lock().unwrap().clone()
        }

        fn heads(&self) -> Vec<String> {
            self.heads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn extract_links(&self, url: &str) -> Result<Vec<String>, ExtractError> {
            self.extracted.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| {
                FetchError::Status {
                    url: url.to_string(),
                    status: StatusCode::NOT_FOUND,
                }
                .into()
            })
        }

        async fn fetch_last_modified(&self, url: &str) -> Result<Option<String>, FetchError> {
            self.heads.lock().unwrap().push(url.to_string());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if !self.head_delay.is_zero() {
                tokio::time::sleep(self.head_delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing_heads.contains(url) {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: StatusCode::SERVICE_UNAVAILABLE,
                });
            }
            Ok(self.last_modified.get(url).cloned())
        }
    }

    async fn run(seed: &str, fetcher: ScriptedFetcher) -> (CrawlReport, Arc<ScriptedFetcher>) {
        let fetcher = Arc::new(fetcher);
        let report = crawl(seed, Arc::clone(&fetcher), &CrawlConfig::default()).await;
        (report, fetcher)
    }

    fn urls(sitemap: &SitemapSet) -> Vec<&str> {
        sitemap.iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_sitemap_set_first_record_wins() {
        let mut set = SitemapSet::new();
        assert!(set.insert(LinkRecord {
            url: "https://a.test/x".to_string(),
            last_modified: Some("first".to_string()),
        }));
        assert!(!set.insert(LinkRecord {
            url: "https://a.test/x".to_string(),
            last_modified: Some("second".to_string()),
        }));

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get("https://a.test/x").unwrap().last_modified.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_sitemap_set_serializes_as_list() {
        let mut set = SitemapSet::new();
        set.insert(LinkRecord {
            url: "https://a.test/b".to_string(),
            last_modified: None,
        });
        set.insert(LinkRecord {
            url: "https://a.test/a".to_string(),
            last_modified: Some("Wed, 21 Oct 2015 07:28:00 GMT".to_string()),
        });

        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(
            json,
            r#"[{"url":"https://a.test/a","last_modified":"Wed, 21 Oct 2015 07:28:00 GMT"},{"url":"https://a.test/b","last_modified":null}]"#
        );
    }

    #[test]
    fn test_origin_filter_is_string_prefix() {
        assert!(is_same_origin("https://a.test/", "https://a.test/foo"));
        assert!(is_same_origin("https://a.test/docs", "https://a.test/docs-old/x"));
        assert!(!is_same_origin("https://a.test/docs", "https://a.test/blog"));
        assert!(!is_same_origin("https://a.test/", "http://a.test/foo"));
        assert!(!is_same_origin("https://a.test/", "https://b.test/bar"));
    }

    #[tokio::test]
    async fn test_same_origin_link_followed_and_back_link_not_rescanned() {
        let fetcher = ScriptedFetcher::default()
            .page("https://a.test/", &["https://a.test/foo", "https://b.test/bar"])
            .page("https://a.test/foo", &["https://a.test/"]);

        let (report, fetcher) = run("https://a.test/", fetcher).await;

        assert_eq!(urls(&report.sitemap), vec!["https://a.test/", "https://a.test/foo"]);
        assert_eq!(fetcher.extracted(), vec!["https://a.test/", "https://a.test/foo"]);
        assert!(!fetcher.heads().contains(&"https://b.test/bar".to_string()));
    }

    #[tokio::test]
    async fn test_seed_not_recorded_unless_linked() {
        let fetcher = ScriptedFetcher::default().page("https://a.test/", &[]);

        let (report, fetcher) = run("https://a.test/", fetcher).await;

        assert!(report.sitemap.is_empty());
        assert_eq!(fetcher.extracted(), vec!["https://a.test/"]);
        assert_eq!(report.stats.pages_scanned, 1);
    }

    #[tokio::test]
    async fn test_missing_last_modified_recorded_as_absent() {
        let fetcher = ScriptedFetcher::default()
            .page("https://a.test/", &["https://a.test/dated", "https://a.test/undated"])
            .page("https://a.test/dated", &[])
            .page("https://a.test/undated", &[])
            .modified("https://a.test/dated", "Wed, 21 Oct 2015 07:28:00 GMT");

        let (report, _) = run("https://a.test/", fetcher).await;

        let dated = report.sitemap.get("https://a.test/dated").unwrap();
        assert_eq!(dated.last_modified.as_deref(), Some("Wed, 21 Oct 2015 07:28:00 GMT"));
        let undated = report.sitemap.get("https://a.test/undated").unwrap();
        assert_eq!(undated.last_modified, None);
    }

    #[tokio::test]
    async fn test_failed_metadata_fetch_drops_only_that_link() {
        let fetcher = ScriptedFetcher::default()
            .page(
                "https://a.test/",
                &["https://a.test/a", "https://a.test/b", "https://a.test/c"],
            )
            .page("https://a.test/a", &[])
            .page("https://a.test/b", &[])
            .page("https://a.test/c", &[])
            .failing_head("https://a.test/b");

        let (report, fetcher) = run("https://a.test/", fetcher).await;

        assert_eq!(urls(&report.sitemap), vec!["https://a.test/a", "https://a.test/c"]);
        assert_eq!(report.stats.metadata_failures, 1);
        assert!(!fetcher.extracted().contains(&"https://a.test/b".to_string()));
    }

    #[tokio::test]
    async fn test_failed_extraction_does_not_abort_crawl() {
        // /x fails to load; /y and what it links to are still found
        let fetcher = ScriptedFetcher::default()
            .page("https://a.test/", &["https://a.test/x", "https://a.test/y"])
            .page("https://a.test/y", &["https://a.test/z"])
            .page("https://a.test/z", &[]);

        let (report, _) = run("https://a.test/", fetcher).await;

        assert_eq!(
            urls(&report.sitemap),
            vec!["https://a.test/x", "https://a.test/y", "https://a.test/z"]
        );
        assert_eq!(report.stats.extraction_failures, 1);
        assert_eq!(report.stats.pages_scanned, 4);
    }

    #[tokio::test]
    async fn test_unreachable_seed_yields_empty_sitemap() {
        let (report, _) = run("https://a.test/", ScriptedFetcher::default()).await;

        assert!(report.sitemap.is_empty());
        assert_eq!(report.stats.extraction_failures, 1);
    }

    #[tokio::test]
    async fn test_cycles_scan_each_page_once() {
        let fetcher = ScriptedFetcher::default()
            .page("https://a.test/", &["https://a.test/a"])
            .page("https://a.test/a", &["https://a.test/b", "https://a.test/"])
            .page("https://a.test/b", &["https://a.test/a", "https://a.test/", "https://a.test/c"])
            .page("https://a.test/c", &["https://a.test/b", "https://a.test/a"]);

        let (report, fetcher) = run("https://a.test/", fetcher).await;

        let mut extracted = fetcher.extracted();
        extracted.sort();
        assert_eq!(
            extracted,
            vec!["https://a.test/", "https://a.test/a", "https://a.test/b", "https://a.test/c"]
        );
        assert_eq!(report.sitemap.len(), 4);
    }

    #[tokio::test]
    async fn test_repeated_and_known_links_fetched_once() {
        let fetcher = ScriptedFetcher::default()
            .page(
                "https://a.test/",
                &["https://a.test/a", "https://a.test/a", "https://a.test/b"],
            )
            .page("https://a.test/a", &["https://a.test/b"])
            .page("https://a.test/b", &[]);

        let (_, fetcher) = run("https://a.test/", fetcher).await;

        let mut heads = fetcher.heads();
        heads.sort();
        assert_eq!(heads, vec!["https://a.test/a", "https://a.test/b"]);
    }

    #[tokio::test]
    async fn test_prefix_filter_uses_full_seed() {
        let fetcher = ScriptedFetcher::default()
            .page(
                "https://a.test/docs/",
                &["https://a.test/docs/intro", "https://a.test/blog", "mailto:hi@a.test"],
            )
            .page("https://a.test/docs/intro", &[]);

        let (report, fetcher) = run("https://a.test/docs/", fetcher).await;

        assert_eq!(urls(&report.sitemap), vec!["https://a.test/docs/intro"]);
        assert_eq!(fetcher.heads(), vec!["https://a.test/docs/intro"]);
    }

    #[tokio::test]
    async fn test_concurrency_ceiling_respected() {
        let links: Vec<String> = (0..20).map(|i| format!("https://a.test/p{i}")).collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

        let mut fetcher = ScriptedFetcher::default().page("https://a.test/", &link_refs);
        for link in &links {
            fetcher = fetcher.page(link, &[]);
        }
        fetcher.head_delay = Duration::from_millis(20);

        let fetcher = Arc::new(fetcher);
        let config = CrawlConfig::builder().concurrency(3).build();
        let report = crawl("https://a.test/", Arc::clone(&fetcher), &config).await;

        assert_eq!(report.sitemap.len(), 20);
        let max = fetcher.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "saw {max} concurrent fetches");
        assert!(max >= 1);
    }

    #[tokio::test]
    async fn test_crawl_against_http_server() {
        let mut server = Server::new_async().await;
        let base = server.url();

        let home = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/foo">Foo</a><a href="https://b.test/bar">Bar</a>"#)
            .expect(1)
            .create_async()
            .await;
        let foo = server
            .mock("GET", "/foo")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(format!(r#"<a href="{base}/">Home</a>"#))
            .expect(1)
            .create_async()
            .await;
        let _foo_head = server
            .mock("HEAD", "/foo")
            .with_status(200)
            .with_header("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT")
            .create_async()
            .await;
        let _home_head = server.mock("HEAD", "/").with_status(200).create_async().await;

        let seed = format!("{base}/");
        let fetcher = Arc::new(HttpFetcher::new(&CrawlConfig::default()).unwrap());
        let report = crawl(&seed, fetcher, &CrawlConfig::default()).await;

        home.assert_async().await;
        foo.assert_async().await;

        let foo_url = format!("{base}/foo");
        assert_eq!(urls(&report.sitemap), vec![seed.as_str(), foo_url.as_str()]);
        assert_eq!(
            report.sitemap.get(&foo_url).unwrap().last_modified.as_deref(),
            Some("Wed, 21 Oct 2015 07:28:00 GMT")
        );
        assert_eq!(report.sitemap.get(&seed).unwrap().last_modified, None);
    }
}

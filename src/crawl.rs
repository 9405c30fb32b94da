//! Crawl stages: playlists, movie pages, external links.
//!
//! The crawl runs as three strictly ordered stages. Each stage fans out over
//! its input pages under the shared semaphore, joins all workers, and hands a
//! complete result to the next stage. A failed page is recorded and skipped;
//! it never aborts the stage. Only the site root fetch retries transient
//! failures - it is the one fetch the whole run hinges on.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, error, warn};
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio_retry::RetryIf;
use url::Url;

use crate::config::Config;
use crate::error_handling::{
    categorize_status, get_retry_strategy, update_error_stats, CrawlStats, InfoType, WarningType,
};
use crate::extract::{extract_links, HrefFilter};
use crate::fetch::{fetch_html, FetchError, FetchedPage};

/// Shared resources for the crawl stages.
pub struct CrawlContext {
    /// Shared HTTP client.
    pub client: Arc<Client>,
    /// Concurrency limiter shared by all stages.
    pub semaphore: Arc<Semaphore>,
    /// Error/warning/info counters.
    pub stats: Arc<CrawlStats>,
    /// Run configuration.
    pub config: Arc<Config>,
    /// Requests finished so far (success or failure), across all stages.
    pub completed: Arc<AtomicUsize>,
    /// Requests planned so far, across all stages.
    pub total: Arc<AtomicUsize>,
}

impl CrawlContext {
    /// Creates a context over the shared client, semaphore, and stats.
    pub fn new(
        client: Arc<Client>,
        semaphore: Arc<Semaphore>,
        stats: Arc<CrawlStats>,
        config: Arc<Config>,
    ) -> Self {
        CrawlContext {
            client,
            semaphore,
            stats,
            config,
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// A page that could not contribute links, with the reason.
#[derive(Debug, Clone)]
pub struct PageFailure {
    /// The page URL.
    pub url: String,
    /// Human-readable failure reason.
    pub error: String,
}

/// Result of the playlist enumeration stage.
#[derive(Debug)]
pub struct PlaylistDiscovery {
    /// Playlist page URLs in document order, deduplicated.
    pub playlists: Vec<String>,
    /// Why the site root yielded nothing, if it did.
    ///
    /// Distinguishes "the site has no playlists" from "we never saw the
    /// site": `None` with an empty list is a genuinely empty site.
    pub root_failure: Option<PageFailure>,
}

/// Result of the movie-page enumeration stage.
#[derive(Debug)]
pub struct MovieDiscovery {
    /// Movie detail page URLs, deduplicated, in playlist-then-document order.
    pub movie_pages: Vec<String>,
    /// Playlist pages that could not be fetched.
    pub failures: Vec<PageFailure>,
}

/// Result of the external-link extraction stage.
#[derive(Debug)]
pub struct LinkDiscovery {
    /// External file-host links discovered across all movie pages.
    pub links: HashSet<String>,
    /// Movie pages that could not be fetched.
    pub failures: Vec<PageFailure>,
    /// Movie pages that fetched and parsed fine but carried no matching link.
    pub pages_without_links: usize,
}

/// Why a root fetch attempt failed, for retry classification.
enum RootAttemptError {
    Fetch(FetchError),
    Status(u16),
}

impl RootAttemptError {
    fn is_retriable(&self) -> bool {
        match self {
            RootAttemptError::Fetch(e) => {
                let cause = e.cause();
                cause.is_timeout() || cause.is_connect() || cause.is_request()
            }
            // 429 and 5xx answers from the root are worth another attempt;
            // other statuses are authoritative
            RootAttemptError::Status(status) => {
                *status == 429 || (500..600).contains(status)
            }
        }
    }
}

/// Fetches the site root with retries for transient failures.
///
/// Root unreachability is the one condition that can blank the entire run,
/// so unlike the per-page fetches it gets the retry treatment: transport
/// errors, 429, and 5xx answers are retried with backoff up to the
/// configured attempt budget.
async fn fetch_root(ctx: &CrawlContext, root_url: &Url) -> Result<FetchedPage, PageFailure> {
    let retry_strategy = get_retry_strategy(
        ctx.config.retry_initial_delay_ms,
        ctx.config.probe_attempts,
    );
    let timeout = Duration::from_secs(ctx.config.root_timeout_seconds);

    let attempt_count = Arc::new(std::sync::atomic::AtomicU32::new(0));

    let result = RetryIf::spawn(
        retry_strategy,
        || {
            let attempt_count = Arc::clone(&attempt_count);
            async move {
                let attempt = attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt > 1 {
                    ctx.stats.increment_info(InfoType::TransientRetry);
                    debug!("Retrying site root fetch (attempt {})", attempt);
                }

                let page = fetch_html(&ctx.client, root_url.as_str(), timeout)
                    .await
                    .map_err(RootAttemptError::Fetch)?;
                if page.is_success() {
                    Ok(page)
                } else {
                    Err(RootAttemptError::Status(page.status))
                }
            }
        },
        |e: &RootAttemptError| e.is_retriable(),
    )
    .await;

    ctx.completed.fetch_add(1, Ordering::SeqCst);

    result.map_err(|e| match e {
        RootAttemptError::Fetch(fetch_err) => {
            update_error_stats(&ctx.stats, fetch_err.cause());
            PageFailure {
                url: root_url.to_string(),
                error: fetch_err.cause().to_string(),
            }
        }
        RootAttemptError::Status(status) => {
            ctx.stats.increment_error(categorize_status(status));
            PageFailure {
                url: root_url.to_string(),
                error: format!("HTTP status {status}"),
            }
        }
    })
}

/// Enumerates playlist pages from the site root.
///
/// Fetches the root, extracts same-host links under the playlist prefix, and
/// dedups them preserving document order. A root failure (transport error
/// after retries, non-2xx answer, or an unparseable site URL) yields an
/// empty list with the failure recorded - the run continues with nothing to
/// do rather than aborting.
pub async fn discover_playlists(ctx: &CrawlContext) -> PlaylistDiscovery {
    ctx.total.fetch_add(1, Ordering::SeqCst);

    let root_url = match Url::parse(&ctx.config.site_url) {
        Ok(url) => url,
        Err(e) => {
            error!("Invalid site URL '{}': {}", ctx.config.site_url, e);
            ctx.completed.fetch_add(1, Ordering::SeqCst);
            return PlaylistDiscovery {
                playlists: Vec::new(),
                root_failure: Some(PageFailure {
                    url: ctx.config.site_url.clone(),
                    error: format!("invalid site URL: {e}"),
                }),
            };
        }
    };

    match fetch_root(ctx, &root_url).await {
        Ok(page) => {
            let filter = HrefFilter::PathPrefix(ctx.config.playlist_prefix.clone());
            let playlists = dedupe_preserving_order(extract_links(&page.body, &root_url, &filter));
            if playlists.is_empty() {
                warn!("Site root {} contained no playlist links", root_url);
            } else {
                debug!("Found {} playlists on {}", playlists.len(), root_url);
            }
            PlaylistDiscovery {
                playlists,
                root_failure: None,
            }
        }
        Err(failure) => {
            error!("Failed to fetch site root {}: {}", failure.url, failure.error);
            PlaylistDiscovery {
                playlists: Vec::new(),
                root_failure: Some(failure),
            }
        }
    }
}

/// Enumerates movie detail pages from every playlist page.
///
/// Playlist pages are fetched concurrently under the semaphore; each yields
/// its movie-prefix links, aggregated in playlist order and deduplicated
/// globally. A failed playlist contributes zero movies and a failure record.
pub async fn discover_movie_pages(ctx: &CrawlContext, playlists: &[String]) -> MovieDiscovery {
    let filter = HrefFilter::PathPrefix(ctx.config.movie_prefix.clone());
    let outcomes = fetch_and_extract_all(ctx, playlists, &filter).await;

    let mut movie_pages = Vec::new();
    let mut failures = Vec::new();
    let mut seen = HashSet::new();

    for (url, outcome) in outcomes {
        match outcome {
            Ok(links) => {
                if links.is_empty() {
                    ctx.stats.increment_warning(WarningType::EmptyPlaylist);
                    debug!("Playlist {} contained no movie links", url);
                }
                for link in links {
                    if seen.insert(link.clone()) {
                        movie_pages.push(link);
                    }
                }
            }
            Err(failure) => {
                warn!("Skipping playlist {}: {}", failure.url, failure.error);
                failures.push(failure);
            }
        }
    }

    MovieDiscovery {
        movie_pages,
        failures,
    }
}

/// Extracts external file-host links from every movie page.
///
/// Movie pages are fetched concurrently under the semaphore; every anchor
/// containing the configured host marker counts, so a page may contribute
/// zero, one, or several links. A page with none is recorded as a warning,
/// not a failure.
pub async fn discover_external_links(ctx: &CrawlContext, movie_pages: &[String]) -> LinkDiscovery {
    let filter = HrefFilter::Contains(ctx.config.file_host_marker.clone());
    let outcomes = fetch_and_extract_all(ctx, movie_pages, &filter).await;

    let mut links = HashSet::new();
    let mut failures = Vec::new();
    let mut pages_without_links = 0;

    for (url, outcome) in outcomes {
        match outcome {
            Ok(found) => {
                if found.is_empty() {
                    ctx.stats.increment_warning(WarningType::MissingExternalLink);
                    pages_without_links += 1;
                    debug!("No file-host link found on {}", url);
                }
                links.extend(found);
            }
            Err(failure) => {
                warn!("Skipping movie page {}: {}", failure.url, failure.error);
                failures.push(failure);
            }
        }
    }

    LinkDiscovery {
        links,
        failures,
        pages_without_links,
    }
}

/// Fetches a set of pages concurrently and extracts matching links from each.
///
/// Results come back in input order regardless of completion order, so the
/// calling stage's first-seen dedupe stays deterministic. Each page fetch is
/// a single attempt - per-page failures are isolated, not retried.
async fn fetch_and_extract_all(
    ctx: &CrawlContext,
    pages: &[String],
    filter: &HrefFilter,
) -> Vec<(String, Result<Vec<String>, PageFailure>)> {
    ctx.total.fetch_add(pages.len(), Ordering::SeqCst);

    let timeout = Duration::from_secs(ctx.config.timeout_seconds);
    let mut tasks = FuturesUnordered::new();

    for (idx, url) in pages.iter().enumerate() {
        let permit = match Arc::clone(&ctx.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Semaphore closed, skipping page: {url}");
                continue;
            }
        };

        let client = Arc::clone(&ctx.client);
        let stats = Arc::clone(&ctx.stats);
        let completed = Arc::clone(&ctx.completed);
        let url = url.clone();
        let filter = filter.clone();

        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            let outcome = fetch_and_extract(&client, &url, timeout, &filter, &stats).await;
            completed.fetch_add(1, Ordering::SeqCst);
            (idx, url, outcome)
        }));
    }

    let mut indexed: Vec<Option<(String, Result<Vec<String>, PageFailure>)>> =
        (0..pages.len()).map(|_| None).collect();

    while let Some(task_result) = tasks.next().await {
        match task_result {
            Ok((idx, url, outcome)) => {
                if let Some(slot) = indexed.get_mut(idx) {
                    *slot = Some((url, outcome));
                }
            }
            Err(join_error) => {
                error!("Crawl task panicked: {:?}", join_error);
            }
        }
    }

    indexed.into_iter().flatten().collect()
}

/// Fetches one page and extracts its matching links.
async fn fetch_and_extract(
    client: &Client,
    url: &str,
    timeout: Duration,
    filter: &HrefFilter,
    stats: &CrawlStats,
) -> Result<Vec<String>, PageFailure> {
    let base = match Url::parse(url) {
        Ok(base) => base,
        Err(e) => {
            return Err(PageFailure {
                url: url.to_string(),
                error: format!("invalid page URL: {e}"),
            })
        }
    };

    match fetch_html(client, url, timeout).await {
        Ok(page) if page.is_success() => Ok(extract_links(&page.body, &base, filter)),
        Ok(page) => {
            stats.increment_error(categorize_status(page.status));
            Err(PageFailure {
                url: url.to_string(),
                error: format!("HTTP status {}", page.status),
            })
        }
        Err(fetch_err) => {
            update_error_stats(stats, fetch_err.cause());
            Err(PageFailure {
                url: url.to_string(),
                error: fetch_err.cause().to_string(),
            })
        }
    }
}

fn dedupe_preserving_order(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_preserving_order() {
        let links = vec![
            "https://a.example/1".to_string(),
            "https://a.example/2".to_string(),
            "https://a.example/1".to_string(),
            "https://a.example/3".to_string(),
            "https://a.example/2".to_string(),
        ];
        assert_eq!(
            dedupe_preserving_order(links),
            vec![
                "https://a.example/1".to_string(),
                "https://a.example/2".to_string(),
                "https://a.example/3".to_string(),
            ]
        );
    }

    #[test]
    fn test_dedupe_empty_input() {
        assert!(dedupe_preserving_order(Vec::new()).is_empty());
    }

    #[test]
    fn test_root_attempt_status_retriability() {
        assert!(RootAttemptError::Status(429).is_retriable());
        assert!(RootAttemptError::Status(500).is_retriable());
        assert!(RootAttemptError::Status(503).is_retriable());
        assert!(!RootAttemptError::Status(404).is_retriable());
        assert!(!RootAttemptError::Status(403).is_retriable());
        assert!(!RootAttemptError::Status(400).is_retriable());
    }

    // Transport-level retriability (timeouts, connection resets) needs real
    // reqwest::Error instances; covered by the probe and pipeline
    // integration tests against a live mock server.
}

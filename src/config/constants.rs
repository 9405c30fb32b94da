//! Configuration constants.
//!
//! This module defines the defaults used throughout the application,
//! including timeouts, concurrency limits, and retry parameters.

/// Default site root to crawl.
pub const DEFAULT_SITE_URL: &str = "https://basharat-movies-hub.onrender.com";

/// Default path of the persisted link snapshot.
pub const DEFAULT_STATE_FILE: &str = "./known_links.txt";

/// Maximum concurrent requests (semaphore limit).
///
/// Kept in the 8-16 range: high enough to clear a few hundred pages
/// quickly, low enough not to hammer a small hosted site.
pub const SEMAPHORE_LIMIT: usize = 12;

/// Progress logging interval in seconds.
pub const LOGGING_INTERVAL: usize = 5;

/// Per-request timeout in seconds for playlist/movie pages and probes.
pub const PAGE_TIMEOUT_SECS: u64 = 10;

/// Timeout in seconds for the site root fetch.
///
/// The root page is the largest and the one fetch the whole run hinges on,
/// so it gets a longer budget than the per-page timeout.
pub const ROOT_TIMEOUT_SECS: u64 = 15;

/// Whole-run deadline in seconds. `0` disables the deadline.
pub const RUN_TIMEOUT_SECS: u64 = 900;

/// Default User-Agent string for HTTP requests.
///
/// A browser-like value; some hosts serve crawlers a stripped page or an
/// outright block. Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default path prefix identifying playlist pages on the site.
pub const DEFAULT_PLAYLIST_PREFIX: &str = "/playlist/";

/// Default path prefix identifying movie detail pages on the site.
pub const DEFAULT_MOVIE_PREFIX: &str = "/movie/";

/// Default substring identifying external file-host links.
pub const DEFAULT_FILE_HOST_MARKER: &str = "gofile.io/d/";

// Retry strategy
/// Initial delay in milliseconds before the first retry.
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which the retry delay is multiplied on each attempt.
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds.
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Total number of probe attempts (initial attempt plus retries).
pub const PROBE_ATTEMPTS: u32 = 3;

/// Environment variable consulted for the notification endpoint when
/// `--webhook-url` is not given.
pub const WEBHOOK_URL_ENV: &str = "LINK_REFRESHER_WEBHOOK_URL";

//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_FILE_HOST_MARKER, DEFAULT_MOVIE_PREFIX, DEFAULT_PLAYLIST_PREFIX, DEFAULT_SITE_URL,
    DEFAULT_STATE_FILE, DEFAULT_USER_AGENT, PAGE_TIMEOUT_SECS, PROBE_ATTEMPTS,
    RETRY_INITIAL_DELAY_MS, ROOT_TIMEOUT_SECS, RUN_TIMEOUT_SECS, SEMAPHORE_LIMIT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Exit-status policy evaluated after a completed run.
///
/// A run that finishes its pass always produces a report; this policy decides
/// whether the process additionally signals failure to the scheduler.
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Always exit 0 after a completed pass
    Never,
    /// Exit non-zero when the site root could not be fetched (default)
    RootFetch,
    /// Exit non-zero when any page fetch or link probe failed
    AnyFailure,
}

/// Run configuration, parsed from the command line.
///
/// Every field has a default, so the struct can also be constructed
/// programmatically for library use.
///
/// # Examples
///
/// ```no_run
/// use link_refresher::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     site_url: "https://movies.example.com".to_string(),
///     state_file: PathBuf::from("/var/lib/links.txt"),
///     max_concurrency: 8,
///     ..Default::default()
/// };
/// ```
#[derive(Parser, Debug, Clone)]
#[command(
    name = "link_refresher",
    about = "Discovers a movie site's external file-host links, probes their liveness, and diffs them against the previous run"
)]
pub struct Config {
    /// Site root to crawl
    #[arg(long, default_value = DEFAULT_SITE_URL)]
    pub site_url: String,

    /// Path of the persisted link snapshot
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Maximum concurrent requests
    #[arg(long, default_value_t = SEMAPHORE_LIMIT)]
    pub max_concurrency: usize,

    /// Per-request timeout in seconds for pages and probes
    #[arg(long, default_value_t = PAGE_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Timeout in seconds for the site root fetch
    #[arg(long, default_value_t = ROOT_TIMEOUT_SECS)]
    pub root_timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Path prefix identifying playlist pages
    #[arg(long, default_value = DEFAULT_PLAYLIST_PREFIX)]
    pub playlist_prefix: String,

    /// Path prefix identifying movie detail pages
    #[arg(long, default_value = DEFAULT_MOVIE_PREFIX)]
    pub movie_prefix: String,

    /// Substring identifying external file-host links
    #[arg(long, default_value = DEFAULT_FILE_HOST_MARKER)]
    pub file_host_marker: String,

    /// Total probe attempts per link (initial attempt plus retries)
    #[arg(long, default_value_t = PROBE_ATTEMPTS)]
    pub probe_attempts: u32,

    /// Initial delay in milliseconds before the first retry
    #[arg(long, default_value_t = RETRY_INITIAL_DELAY_MS)]
    pub retry_initial_delay_ms: u64,

    /// Whole-run deadline in seconds (0 disables)
    #[arg(long, default_value_t = RUN_TIMEOUT_SECS)]
    pub run_timeout_seconds: u64,

    /// Notification endpoint for the run report (falls back to the
    /// LINK_REFRESHER_WEBHOOK_URL environment variable)
    #[arg(long)]
    pub webhook_url: Option<String>,

    /// Exit-status policy
    #[arg(long, value_enum, default_value_t = FailOn::RootFetch)]
    pub fail_on: FailOn,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            max_concurrency: SEMAPHORE_LIMIT,
            timeout_seconds: PAGE_TIMEOUT_SECS,
            root_timeout_seconds: ROOT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            playlist_prefix: DEFAULT_PLAYLIST_PREFIX.to_string(),
            movie_prefix: DEFAULT_MOVIE_PREFIX.to_string(),
            file_host_marker: DEFAULT_FILE_HOST_MARKER.to_string(),
            probe_attempts: PROBE_ATTEMPTS,
            retry_initial_delay_ms: RETRY_INITIAL_DELAY_MS,
            run_timeout_seconds: RUN_TIMEOUT_SECS,
            webhook_url: None,
            fail_on: FailOn::RootFetch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        // Test all LogLevel variants convert correctly to log::LevelFilter
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_log_level_ordering() {
        // Verify that log levels are ordered correctly (Error < Warn < Info < Debug < Trace)
        let error = log::LevelFilter::from(LogLevel::Error);
        let warn = log::LevelFilter::from(LogLevel::Warn);
        let info = log::LevelFilter::from(LogLevel::Info);
        let debug = log::LevelFilter::from(LogLevel::Debug);
        let trace = log::LevelFilter::from(LogLevel::Trace);

        // Each level should be more restrictive than the next
        assert!(error < warn);
        assert!(warn < info);
        assert!(info < debug);
        assert!(debug < trace);
    }

    #[test]
    fn test_log_format_variants() {
        // Test that LogFormat enum variants can be created and compared
        let plain = LogFormat::Plain;
        let json = LogFormat::Json;

        match plain {
            LogFormat::Plain => {}
            LogFormat::Json => panic!("Plain should not match Json"),
        }

        match json {
            LogFormat::Plain => panic!("Json should not match Plain"),
            LogFormat::Json => {}
        }
    }

    #[test]
    fn test_config_default() {
        // Test Config default values
        let config = Config::default();
        assert_eq!(
            config.site_url,
            "https://basharat-movies-hub.onrender.com".to_string()
        );
        assert_eq!(config.state_file, PathBuf::from("./known_links.txt"));
        assert_eq!(config.max_concurrency, 12);
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.root_timeout_seconds, 15);
        assert_eq!(config.playlist_prefix, "/playlist/");
        assert_eq!(config.movie_prefix, "/movie/");
        assert_eq!(config.file_host_marker, "gofile.io/d/");
        assert_eq!(config.probe_attempts, 3);
        assert_eq!(config.retry_initial_delay_ms, 500);
        assert_eq!(config.run_timeout_seconds, 900);
        assert!(config.webhook_url.is_none());
        assert_eq!(config.fail_on, FailOn::RootFetch);
    }

    #[test]
    fn test_config_concurrency_within_expected_band() {
        // The default worker pool stays in the 8-16 band the target site
        // is sized for
        let config = Config::default();
        assert!((8..=16).contains(&config.max_concurrency));
    }

    #[test]
    fn test_fail_on_equality() {
        assert_eq!(FailOn::Never, FailOn::Never);
        assert_ne!(FailOn::Never, FailOn::RootFetch);
        assert_ne!(FailOn::RootFetch, FailOn::AnyFailure);
    }
}

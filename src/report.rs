//! Per-run report assembly and output.
//!
//! The report is ephemeral: it exists to be logged and optionally pushed
//! through the notifier. Nothing here is persisted; the state snapshot is
//! written separately from the discovered link set.

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::fmt::Write as _;
use strum::IntoEnumIterator;

use crate::crawl::PageFailure;
use crate::error_handling::{CrawlStats, ErrorType, InfoType, WarningType};

/// A discovered link that failed its liveness probe, with the reason.
#[derive(Debug, Clone)]
pub struct LinkFailure {
    /// The probed link.
    pub url: String,
    /// Human-readable failure reason.
    pub error: String,
}

/// Overall health of a completed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunHealth {
    /// The site root was reached; whatever the crawl found is authoritative.
    Ok,
    /// The site root was never fetched, so zero links means "saw nothing",
    /// not "site is empty".
    RootFetchFailed,
}

/// Aggregate outcome of one refresh pass.
#[derive(Debug)]
pub struct RunReport {
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the pass.
    pub elapsed_seconds: f64,
    /// Why the site root yielded nothing, when it did.
    pub root_failure: Option<PageFailure>,
    /// Playlist pages enumerated from the root.
    pub playlists_found: usize,
    /// Playlist pages that could not be fetched.
    pub playlist_failures: Vec<PageFailure>,
    /// Movie detail pages enumerated across all playlists.
    pub movie_pages_found: usize,
    /// Movie pages that could not be fetched.
    pub movie_page_failures: Vec<PageFailure>,
    /// Movie pages that parsed fine but carried no file-host link.
    pub pages_without_links: usize,
    /// Distinct external links discovered this pass.
    pub links_found: usize,
    /// Links that answered their probe with a success status.
    pub links_alive: usize,
    /// Links that did not, with the reason.
    pub failed_links: Vec<LinkFailure>,
    /// Links absent from the previous snapshot, sorted.
    pub new_links: Vec<String>,
    /// Links carried over from the previous snapshot, sorted.
    pub retained_links: Vec<String>,
}

impl RunReport {
    /// Health headline for the pass.
    pub fn health(&self) -> RunHealth {
        if self.root_failure.is_some() {
            RunHealth::RootFetchFailed
        } else {
            RunHealth::Ok
        }
    }

    /// Whether anything along the way failed (root, pages, or probes).
    ///
    /// Pages without links are a warning, not a failure, and do not count.
    pub fn has_failures(&self) -> bool {
        self.root_failure.is_some()
            || !self.playlist_failures.is_empty()
            || !self.movie_page_failures.is_empty()
            || !self.failed_links.is_empty()
    }

    /// One-line summary suitable as a notification subject.
    pub fn subject(&self) -> String {
        match self.health() {
            RunHealth::RootFetchFailed => "Link refresh: site root unreachable".to_string(),
            RunHealth::Ok => format!(
                "Link refresh: {} links checked, {} new, {} down",
                self.links_found,
                self.new_links.len(),
                self.failed_links.len()
            ),
        }
    }

    /// Multi-line summary suitable as a notification body.
    pub fn body(&self) -> String {
        let mut body = String::new();

        if let Some(failure) = &self.root_failure {
            let _ = writeln!(
                body,
                "Site root fetch failed ({}): {}",
                failure.url, failure.error
            );
            let _ = writeln!(body, "No crawl was performed this pass.");
            return body;
        }

        let _ = writeln!(
            body,
            "Refresh pass finished in {:.1}s (started {}).",
            self.elapsed_seconds,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(body);
        let _ = writeln!(body, "Playlists found:     {}", self.playlists_found);
        let _ = writeln!(body, "Movie pages found:   {}", self.movie_pages_found);
        let _ = writeln!(body, "Links discovered:    {}", self.links_found);
        let _ = writeln!(body, "Links alive:         {}", self.links_alive);
        let _ = writeln!(body, "Links down:          {}", self.failed_links.len());
        let _ = writeln!(body, "New since last run:  {}", self.new_links.len());
        let _ = writeln!(body, "Retained:            {}", self.retained_links.len());
        let _ = writeln!(body, "Pages without links: {}", self.pages_without_links);

        if !self.new_links.is_empty() {
            let _ = writeln!(body);
            let _ = writeln!(body, "New links:");
            for link in &self.new_links {
                let _ = writeln!(body, "  {link}");
            }
        }

        if !self.failed_links.is_empty() {
            let _ = writeln!(body);
            let _ = writeln!(body, "Failed links:");
            for failure in &self.failed_links {
                let _ = writeln!(body, "  {}: {}", failure.url, failure.error);
            }
        }

        let page_failures = self
            .playlist_failures
            .iter()
            .chain(self.movie_page_failures.iter());
        let mut wrote_header = false;
        for failure in page_failures {
            if !wrote_header {
                let _ = writeln!(body);
                let _ = writeln!(body, "Page failures:");
                wrote_header = true;
            }
            let _ = writeln!(body, "  {}: {}", failure.url, failure.error);
        }

        body
    }
}

/// Logs the report through the standard logger.
pub fn log_report(report: &RunReport) {
    match report.health() {
        RunHealth::RootFetchFailed => {
            if let Some(failure) = &report.root_failure {
                warn!(
                    "Site root unreachable ({}): {}",
                    failure.url, failure.error
                );
            }
        }
        RunHealth::Ok => {
            info!(
                "Discovered {} links across {} movie pages in {} playlists ({:.1}s)",
                report.links_found,
                report.movie_pages_found,
                report.playlists_found,
                report.elapsed_seconds
            );
            info!(
                "{} alive, {} down, {} new, {} retained",
                report.links_alive,
                report.failed_links.len(),
                report.new_links.len(),
                report.retained_links.len()
            );
        }
    }

    for failure in &report.playlist_failures {
        warn!("Playlist failed: {}: {}", failure.url, failure.error);
    }
    for failure in &report.movie_page_failures {
        warn!("Movie page failed: {}: {}", failure.url, failure.error);
    }
    for failure in &report.failed_links {
        warn!("Link down: {}: {}", failure.url, failure.error);
    }
}

/// Prints error, warning, and info statistics to the log.
pub fn print_crawl_statistics(stats: &CrawlStats) {
    let total_errors = stats.total_errors();
    let total_warnings = stats.total_warnings();
    let total_info = stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_warnings > 0 {
        info!("Warning Counts ({} total):", total_warnings);
        for warning_type in WarningType::iter() {
            let count = stats.get_warning_count(warning_type);
            if count > 0 {
                info!("   {}: {}", warning_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}

/// Prints a simple one-line summary of the run.
///
/// This provides immediate feedback to the user in a concise format.
/// Works with both plain and JSON log formats (log::info! handles formatting).
pub fn print_run_summary(report: &RunReport) {
    match report.health() {
        RunHealth::RootFetchFailed => {
            info!("❌ Site root unreachable; nothing refreshed");
        }
        RunHealth::Ok => {
            info!(
                "✅ Refreshed {} link{} in {:.1}s ({} alive, {} down, {} new)",
                report.links_found,
                if report.links_found == 1 { "" } else { "s" },
                report.elapsed_seconds,
                report.links_alive,
                report.failed_links.len(),
                report.new_links.len()
            );
        }
    }
}

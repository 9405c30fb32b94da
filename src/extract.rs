//! Anchor link extraction.
//!
//! This module provides the link extraction primitive shared by every crawl
//! stage: parse a page tolerantly, walk its anchors in document order, resolve
//! each href against the page URL, and keep the ones a filter accepts.

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

const ANCHOR_SELECTOR_STR: &str = "a[href]";

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(ANCHOR_SELECTOR_STR).unwrap_or_else(|e| {
        log::error!(
            "Failed to parse anchor selector '{}': {}. Using fallback selector.",
            ANCHOR_SELECTOR_STR,
            e
        );
        // Fallback to a known-valid selector that matches nothing
        Selector::parse("*:not(*)")
            .expect("Fallback selector '*:not(*)' should always parse - this is a programming error")
    })
});

/// Predicate deciding which anchors a crawl stage keeps.
#[derive(Debug, Clone)]
pub enum HrefFilter {
    /// Same-host links whose URL path starts with the given prefix.
    ///
    /// Matches the site's own section pages (playlists, movie details) whether
    /// the href was written relative or absolute; links to other hosts are
    /// rejected even when their path happens to match.
    PathPrefix(String),

    /// Links whose resolved URL contains the given substring.
    ///
    /// Matches external file-host links wherever they point.
    Contains(String),
}

impl HrefFilter {
    fn matches(&self, resolved: &Url, base: &Url) -> bool {
        match self {
            HrefFilter::PathPrefix(prefix) => {
                resolved.host_str() == base.host_str() && resolved.path().starts_with(prefix.as_str())
            }
            HrefFilter::Contains(marker) => resolved.as_str().contains(marker.as_str()),
        }
    }
}

/// Extracts matching links from an HTML page.
///
/// Parses tolerantly (malformed HTML yields whatever anchors the parser
/// recovers, never an error), resolves each href against `base`, and returns
/// the absolute URLs accepted by `filter`, in document order. Non-http(s)
/// schemes (`mailto:`, `javascript:`, ...) and unresolvable hrefs are skipped.
///
/// Duplicates are preserved; callers dedupe at the stage level where the
/// first-seen document position matters.
///
/// # Arguments
///
/// * `html` - Raw page body
/// * `base` - The page's own URL, used to resolve relative hrefs
/// * `filter` - Predicate deciding which links to keep
///
/// # Returns
///
/// Absolute URL strings in document order.
pub fn extract_links(html: &str, base: &Url, filter: &HrefFilter) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let resolved = match base.join(href) {
            Ok(url) => url,
            Err(e) => {
                log::debug!("Skipping unresolvable href '{}' on {}: {}", href, base, e);
                continue;
            }
        };

        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }

        if filter.matches(&resolved, base) {
            links.push(resolved.to_string());
        }
    }

    links
}

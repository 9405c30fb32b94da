//! Error handling and crawl statistics.
//!
//! This module provides:
//! - Error type definitions and categorization
//! - Crawl statistics tracking (errors, warnings, info metrics)
//! - Retry strategy configuration
//!
//! Error types are categorized into:
//! - **Errors**: Failures that prevent a page or link from counting
//! - **Warnings**: Pages that parsed fine but yielded nothing
//! - **Info**: Informational metrics (GET fallbacks, transient retries)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_reqwest_error, categorize_status, get_retry_strategy, update_error_stats,
};
pub use stats::CrawlStats;
pub use types::{ErrorType, InfoType, InitializationError, WarningType};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_crawl_stats_initialization() {
        let stats = CrawlStats::new();
        // All error types should be initialized to 0
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        // All warning types should be initialized to 0
        for warning_type in WarningType::iter() {
            assert_eq!(stats.get_warning_count(warning_type), 0);
        }
        // All info types should be initialized to 0
        for info_type in InfoType::iter() {
            assert_eq!(stats.get_info_count(info_type), 0);
        }
    }

    #[test]
    fn test_crawl_stats_increment() {
        let stats = CrawlStats::new();
        stats.increment_error(ErrorType::HttpRequestNotFound);
        assert_eq!(stats.get_error_count(ErrorType::HttpRequestNotFound), 1);

        stats.increment_warning(WarningType::MissingExternalLink);
        assert_eq!(
            stats.get_warning_count(WarningType::MissingExternalLink),
            1
        );

        stats.increment_info(InfoType::HeadNotAllowed);
        assert_eq!(stats.get_info_count(InfoType::HeadNotAllowed), 1);
    }

    #[test]
    fn test_crawl_stats_multiple_increments() {
        let stats = CrawlStats::new();
        stats.increment_error(ErrorType::HttpRequestTimeoutError);
        stats.increment_error(ErrorType::HttpRequestTimeoutError);
        stats.increment_error(ErrorType::HttpRequestTimeoutError);
        assert_eq!(stats.get_error_count(ErrorType::HttpRequestTimeoutError), 3);
    }

    #[test]
    fn test_crawl_stats_totals() {
        let stats = CrawlStats::new();
        stats.increment_error(ErrorType::HttpRequestNotFound);
        stats.increment_error(ErrorType::HttpRequestTimeoutError);
        stats.increment_warning(WarningType::EmptyPlaylist);
        stats.increment_info(InfoType::TransientRetry);

        assert_eq!(stats.total_errors(), 2);
        assert_eq!(stats.total_warnings(), 1);
        assert_eq!(stats.total_info(), 1);
    }
}

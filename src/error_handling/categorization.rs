//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize errors and configure retry strategies.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::stats::CrawlStats;
use super::types::ErrorType;
use crate::config::{RETRY_FACTOR, RETRY_MAX_DELAY_SECS};

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `initial_delay_ms` milliseconds
/// - Backoff factor: `RETRY_FACTOR` (doubles delay each retry)
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
///
/// The iterator yields the delays *between* attempts, so a budget of
/// `attempts` total attempts takes `attempts - 1` delays.
///
/// # Arguments
///
/// * `initial_delay_ms` - Delay before the first retry, in milliseconds
/// * `attempts` - Total attempt budget (initial attempt plus retries)
///
/// # Returns
///
/// A retry strategy iterator ready for use with `tokio_retry::RetryIf`.
pub fn get_retry_strategy(initial_delay_ms: u64, attempts: u32) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(initial_delay_ms)
        .factor(RETRY_FACTOR)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
        .take(attempts.saturating_sub(1) as usize)
}

/// Categorizes an HTTP status code into an `ErrorType`.
///
/// Used for responses that arrived but carried a non-success status, where
/// there is no `reqwest::Error` to inspect.
///
/// # Arguments
///
/// * `status` - The HTTP status code
///
/// # Returns
///
/// The appropriate `ErrorType` for the status code.
pub fn categorize_status(status: u16) -> ErrorType {
    match status {
        // Client errors (4xx)
        400 => ErrorType::HttpRequestBadRequest,
        401 => ErrorType::HttpRequestUnauthorized,
        403 => ErrorType::HttpRequestBotDetectionError,
        404 => ErrorType::HttpRequestNotFound,
        429 => ErrorType::HttpRequestTooManyRequests,
        // Server errors (5xx)
        500 => ErrorType::HttpRequestInternalServerError,
        502 => ErrorType::HttpRequestBadGateway,
        503 => ErrorType::HttpRequestServiceUnavailable,
        504 => ErrorType::HttpRequestGatewayTimeout,
        // Other client/server errors - use generic buckets
        s if (400..500).contains(&s) => ErrorType::HttpRequestOtherClientError,
        s if (500..600).contains(&s) => ErrorType::HttpRequestOtherServerError,
        _ => ErrorType::HttpRequestOtherError,
    }
}

/// Categorizes a `reqwest::Error` into an `ErrorType`.
///
/// This is the unified error categorization logic used wherever a transport
/// error is recorded, to ensure consistency.
///
/// # Arguments
///
/// * `error` - The `reqwest::Error` to categorize
///
/// # Returns
///
/// The appropriate `ErrorType` for the error.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    // Check HTTP status codes first
    if let Some(status) = error.status() {
        return categorize_status(status.as_u16());
    }

    // Check reqwest error types
    if error.is_builder() {
        ErrorType::HttpRequestBuilderError
    } else if error.is_redirect() {
        ErrorType::HttpRequestRedirectError
    } else if error.is_status() {
        ErrorType::HttpRequestStatusError
    } else if error.is_timeout() {
        ErrorType::HttpRequestTimeoutError
    } else if error.is_connect() {
        ErrorType::HttpRequestConnectError
    } else if error.is_body() {
        ErrorType::HttpRequestBodyError
    } else if error.is_decode() {
        ErrorType::HttpRequestDecodeError
    } else if error.is_request() {
        ErrorType::HttpRequestRequestError
    } else {
        ErrorType::HttpRequestOtherError
    }
}

/// Updates crawl statistics based on a `reqwest::Error`.
///
/// Analyzes the error and increments the appropriate `ErrorType` counter.
///
/// # Arguments
///
/// * `stats` - The crawl statistics tracker to update
/// * `error` - The `reqwest::Error` to categorize and record
pub fn update_error_stats(stats: &CrawlStats, error: &reqwest::Error) {
    let error_type = categorize_reqwest_error(error);
    stats.increment_error(error_type);
}

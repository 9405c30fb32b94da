//! HTML page fetching.
//!
//! This module provides the single fetch primitive used by every crawl stage:
//! a GET with a per-request timeout that returns the status and body together.
//! Whether a non-success status is a failure is the caller's decision.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

/// A fetched page: the final HTTP status and the response body.
///
/// The body is read even for non-success statuses; enumeration stages treat a
/// non-2xx page as a failure, while the caller deciding otherwise (e.g. for
/// diagnostics) still has the content.
#[derive(Debug)]
pub struct FetchedPage {
    /// Final HTTP status code after redirects.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl FetchedPage {
    /// Whether the final status is in the 2xx success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error fetching a page: the transport failed before a status was available
/// (DNS, connect, timeout, or body read failure).
#[derive(Error, Debug)]
#[error("failed to fetch {url}")]
pub struct FetchError {
    /// The URL that was being fetched.
    pub url: String,
    /// The underlying transport error.
    #[source]
    pub source: reqwest::Error,
}

impl FetchError {
    /// The underlying `reqwest::Error`, for categorization.
    pub fn cause(&self) -> &reqwest::Error {
        &self.source
    }
}

/// Fetches a page via GET and returns its status and body.
///
/// The request carries the client's User-Agent and overrides the client's
/// default timeout with `timeout`. Redirects are followed; `status` is the
/// final hop's status.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `url` - Absolute URL to fetch
/// * `timeout` - Per-request timeout
///
/// # Errors
///
/// Returns `FetchError` only for transport-level failures. A response with a
/// non-2xx status is returned as `Ok` - the caller decides what that means.
pub async fn fetch_html(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| FetchError {
            url: url.to_string(),
            source,
        })?;

    let status = response.status().as_u16();
    let body = response.text().await.map_err(|source| FetchError {
        url: url.to_string(),
        source,
    })?;

    Ok(FetchedPage { status, body })
}

//! Liveness probing of discovered file-host links.
//!
//! A link is alive when the host answers 2xx. Probes prefer `HEAD` and fall
//! back to `GET` only when the host rejects the method outright (405 or 501).
//! Transient transport failures are retried with backoff; a definitive non-2xx
//! answer is an answer, not a failure, and is never retried.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::debug;
use reqwest::Client;
use thiserror::Error;
use tokio_retry::RetryIf;

use crate::config::Config;
use crate::error_handling::{
    categorize_status, get_retry_strategy, update_error_stats, CrawlStats, InfoType,
};

/// Why a probe concluded a link is not alive.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The host answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),
    /// The request never produced a status.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ProbeError {
    /// Whether another attempt could plausibly change the outcome.
    ///
    /// Only transport-level failures qualify. A status answer, even a 5xx,
    /// is the host's verdict on the link and retrying it would just burn
    /// the attempt budget.
    pub fn is_transient(&self) -> bool {
        match self {
            ProbeError::Status(_) => false,
            ProbeError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        }
    }
}

/// The outcome of probing one link, including how hard we had to try.
#[derive(Debug)]
pub struct ProbeOutcome {
    /// The probed link.
    pub url: String,
    /// Total attempts made (1 when the first answer stuck).
    pub attempts: u32,
    /// Final status on success, or why the link is considered down.
    pub result: Result<u16, ProbeError>,
}

impl ProbeOutcome {
    /// Whether the link answered with a success status.
    pub fn is_alive(&self) -> bool {
        self.result.is_ok()
    }
}

/// Issues a single probe: `HEAD` first, `GET` if the method is refused.
async fn probe_once(client: &Client, url: &str, stats: &CrawlStats) -> Result<u16, ProbeError> {
    let head = client.head(url).send().await?;
    let status = head.status();

    // Some hosts refuse HEAD wholesale; ask again properly.
    let status = if status.as_u16() == 405 || status.as_u16() == 501 {
        stats.increment_info(InfoType::HeadNotAllowed);
        debug!("HEAD not supported by {}, falling back to GET", url);
        client.get(url).send().await?.status()
    } else {
        status
    };

    if status.is_success() {
        Ok(status.as_u16())
    } else {
        Err(ProbeError::Status(status.as_u16()))
    }
}

/// Probes one link for liveness, retrying transient failures with backoff.
pub async fn probe_link(
    client: &Client,
    url: &str,
    config: &Config,
    stats: &CrawlStats,
) -> ProbeOutcome {
    let retry_strategy = get_retry_strategy(config.retry_initial_delay_ms, config.probe_attempts);
    let attempt_count = Arc::new(AtomicU32::new(0));

    let result = RetryIf::spawn(
        retry_strategy,
        || {
            let attempt_count = Arc::clone(&attempt_count);
            async move {
                let attempt = attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt > 1 {
                    stats.increment_info(InfoType::TransientRetry);
                    debug!("Retrying probe of {} (attempt {})", url, attempt);
                }
                probe_once(client, url, stats).await
            }
        },
        |e: &ProbeError| e.is_transient(),
    )
    .await;

    match &result {
        Ok(status) => debug!("Link {} is alive (HTTP {})", url, status),
        Err(ProbeError::Status(status)) => {
            stats.increment_error(categorize_status(*status));
            debug!("Link {} is down (HTTP {})", url, status);
        }
        Err(ProbeError::Transport(e)) => {
            update_error_stats(stats, e);
            debug!("Link {} is unreachable: {}", url, e);
        }
    }

    ProbeOutcome {
        url: url.to_string(),
        attempts: attempt_count.load(Ordering::SeqCst),
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_not_transient() {
        assert!(!ProbeError::Status(404).is_transient());
        assert!(!ProbeError::Status(500).is_transient());
        assert!(!ProbeError::Status(503).is_transient());
    }

    #[test]
    fn test_probe_outcome_alive() {
        let outcome = ProbeOutcome {
            url: "https://gofile.io/d/abc123".to_string(),
            attempts: 1,
            result: Ok(200),
        };
        assert!(outcome.is_alive());

        let outcome = ProbeOutcome {
            url: "https://gofile.io/d/abc123".to_string(),
            attempts: 1,
            result: Err(ProbeError::Status(404)),
        };
        assert!(!outcome.is_alive());
    }

    #[test]
    fn test_probe_error_display() {
        let err = ProbeError::Status(404);
        assert_eq!(err.to_string(), "HTTP status 404");
    }
}

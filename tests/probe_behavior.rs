//! Tests for link probing: method fallback, retry policy, attempt budget.
//!
//! Status-code behavior runs against an `httptest` server. Transport-level
//! failures (the retriable kind) can't be produced by `httptest`, so those
//! tests use a raw `TcpListener` that accepts and immediately drops
//! connections.

use std::sync::Arc;

use httptest::{matchers::*, responders::*, Expectation, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use link_refresher::{probe_link, Config, CrawlStats, InfoType};

fn probe_config() -> Config {
    Config {
        retry_initial_delay_ms: 1,
        probe_attempts: 3,
        ..Config::default()
    }
}

/// Starts a server that drops the first `drops` connections without a byte
/// of response, then answers every later request with 200.
///
/// A dropped connection surfaces in reqwest as a transport error, which is
/// exactly the class the prober retries.
async fn start_flaky_server(drops: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");

    tokio::spawn(async move {
        let mut seen = 0usize;
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            seen += 1;
            if seen <= drops {
                drop(socket);
                continue;
            }
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}/d/flaky", addr)
}

/// A 2xx answer on the first HEAD makes the link alive in one attempt.
#[tokio::test]
async fn test_alive_link_single_attempt() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/d/alive"))
            .times(1)
            .respond_with(status_code(200)),
    );

    let client = reqwest::Client::new();
    let stats = CrawlStats::new();
    let outcome = probe_link(&client, &server.url_str("/d/alive"), &probe_config(), &stats).await;

    assert!(outcome.is_alive());
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.result.unwrap(), 200);
}

/// A 404 is the host's answer, not a transient fault: exactly one attempt.
#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = Server::run();
    // times(1) fails the test if the prober retries.
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/d/gone"))
            .times(1)
            .respond_with(status_code(404)),
    );

    let client = reqwest::Client::new();
    let stats = CrawlStats::new();
    let outcome = probe_link(&client, &server.url_str("/d/gone"), &probe_config(), &stats).await;

    assert!(!outcome.is_alive());
    assert_eq!(outcome.attempts, 1);
    assert_eq!(stats.get_info_count(InfoType::TransientRetry), 0);
}

/// A 5xx probe answer is also definitive; the attempt budget is for
/// transport faults only.
#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/d/broken"))
            .times(1)
            .respond_with(status_code(503)),
    );

    let client = reqwest::Client::new();
    let stats = CrawlStats::new();
    let outcome = probe_link(&client, &server.url_str("/d/broken"), &probe_config(), &stats).await;

    assert!(!outcome.is_alive());
    assert_eq!(outcome.attempts, 1);
}

/// Hosts that refuse HEAD get a GET instead, within the same attempt.
#[tokio::test]
async fn test_head_refused_falls_back_to_get() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/d/no-head"))
            .times(1)
            .respond_with(status_code(405)),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/d/no-head"))
            .times(1)
            .respond_with(status_code(200).body("file page")),
    );

    let client = reqwest::Client::new();
    let stats = CrawlStats::new();
    let outcome = probe_link(&client, &server.url_str("/d/no-head"), &probe_config(), &stats).await;

    assert!(outcome.is_alive());
    assert_eq!(outcome.attempts, 1, "fallback is not a separate attempt");
    assert_eq!(stats.get_info_count(InfoType::HeadNotAllowed), 1);
}

/// Two dropped connections then a clean answer: alive within the budget.
#[tokio::test]
async fn test_transient_failures_retried_until_success() {
    let url = start_flaky_server(2).await;

    let client = reqwest::Client::new();
    let stats = CrawlStats::new();
    let outcome = probe_link(&client, &url, &probe_config(), &stats).await;

    assert!(outcome.is_alive(), "third attempt should succeed: {:?}", outcome.result);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(stats.get_info_count(InfoType::TransientRetry), 2);
}

/// A host that never answers exhausts the budget and stays dead.
#[tokio::test]
async fn test_transient_failures_exhaust_attempt_budget() {
    // Drops far more connections than the budget allows attempts.
    let url = start_flaky_server(100).await;

    let client = reqwest::Client::new();
    let stats = CrawlStats::new();
    let outcome = probe_link(&client, &url, &probe_config(), &stats).await;

    assert!(!outcome.is_alive());
    assert_eq!(outcome.attempts, 3, "budget is total attempts, not retries");
    assert_eq!(stats.get_info_count(InfoType::TransientRetry), 2);
}

/// The attempt budget is honored when configured down to a single try.
#[tokio::test]
async fn test_single_attempt_budget_means_no_retries() {
    let url = start_flaky_server(100).await;

    let client = reqwest::Client::new();
    let stats = CrawlStats::new();
    let mut config = probe_config();
    config.probe_attempts = 1;
    let outcome = probe_link(&client, &url, &config, &stats).await;

    assert!(!outcome.is_alive());
    assert_eq!(outcome.attempts, 1);
    assert_eq!(stats.get_info_count(InfoType::TransientRetry), 0);
}

/// Probing a vanished host (connection refused) is transient, so the budget
/// is spent, but the outcome is still dead.
#[tokio::test]
async fn test_connection_refused_retried_then_dead() {
    // Bind a port, then free it so nothing listens there.
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");
    drop(listener);

    let client = reqwest::Client::new();
    let stats = CrawlStats::new();
    let outcome = probe_link(
        &client,
        &format!("http://{}/d/vanished", addr),
        &probe_config(),
        &stats,
    )
    .await;

    assert!(!outcome.is_alive());
    assert_eq!(outcome.attempts, 3);
}

/// Keeping the shared stats Arc-able: concurrent probes may record retries
/// simultaneously.
#[tokio::test]
async fn test_concurrent_probes_share_stats() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/d/one"))
            .times(1)
            .respond_with(status_code(200)),
    );
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/d/two"))
            .times(1)
            .respond_with(status_code(404)),
    );

    let client = Arc::new(reqwest::Client::new());
    let stats = Arc::new(CrawlStats::new());
    let config = Arc::new(probe_config());

    let mut handles = Vec::new();
    for path in ["/d/one", "/d/two"] {
        let client = Arc::clone(&client);
        let stats = Arc::clone(&stats);
        let config = Arc::clone(&config);
        let url = server.url_str(path);
        handles.push(tokio::spawn(async move {
            probe_link(&client, &url, &config, &stats).await
        }));
    }

    let mut alive = 0;
    for handle in handles {
        let outcome = handle.await.expect("probe task");
        if outcome.is_alive() {
            alive += 1;
        }
    }
    assert_eq!(alive, 1);
}

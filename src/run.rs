//! One refresh pass, end to end.
//!
//! Orchestrates the stages in strict sequence: load the previous snapshot,
//! enumerate playlists, enumerate movie pages, extract external links, probe
//! them, diff against the snapshot, report, save, notify. Each stage joins
//! all of its workers before the next begins, and the snapshot is read once
//! before and written once after all concurrent work.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{error, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, LOGGING_INTERVAL};
use crate::crawl::{
    discover_external_links, discover_movie_pages, discover_playlists, CrawlContext,
    LinkDiscovery, MovieDiscovery, PlaylistDiscovery,
};
use crate::diff::diff_links;
use crate::error_handling::CrawlStats;
use crate::initialization::{init_client, init_semaphore};
use crate::notify::{deliver_report, WebhookNotifier};
use crate::probe::probe_link;
use crate::report::{log_report, print_crawl_statistics, LinkFailure, RunReport};
use crate::state::{FileStateStore, LinkStateStore};

/// Everything the crawl-and-probe phase produced, before diffing.
struct CrawlOutcome {
    playlists: PlaylistDiscovery,
    movies: MovieDiscovery,
    links: LinkDiscovery,
    links_alive: usize,
    failed_links: Vec<LinkFailure>,
}

/// Runs one refresh pass against the file-backed snapshot from the config.
pub async fn run_refresh(config: &Config) -> Result<RunReport> {
    let store = FileStateStore::new(&config.state_file);
    run_refresh_with_store(config, &store).await
}

/// Runs one refresh pass against an injected snapshot store.
///
/// Returns `Err` only for catastrophic conditions: the HTTP client could not
/// be built, the run exceeded its deadline, or the snapshot could not be
/// saved. Everything else (unreachable root, failed pages, dead links) is
/// folded into the returned report.
pub async fn run_refresh_with_store(
    config: &Config,
    store: &dyn LinkStateStore,
) -> Result<RunReport> {
    let started_at = Utc::now();
    let start_time = Instant::now();

    let previous = match store.load() {
        Ok(links) => links,
        Err(e) => {
            warn!("Could not load previous link snapshot ({e:#}); treating as first run");
            HashSet::new()
        }
    };
    info!(
        "Starting refresh of {} ({} links in previous snapshot)",
        config.site_url,
        previous.len()
    );

    let client = init_client(config).context("Failed to initialize HTTP client")?;
    let semaphore = init_semaphore(config.max_concurrency);
    let stats = Arc::new(CrawlStats::new());
    let ctx = CrawlContext::new(client, semaphore, Arc::clone(&stats), Arc::new(config.clone()));

    let cancel_token = CancellationToken::new();
    let logging_task = spawn_progress_logger(&ctx, start_time, cancel_token.clone());

    // When the deadline trips, in-flight requests are abandoned; the caller
    // is expected to treat that as catastrophic and exit.
    let crawl_result = if config.run_timeout_seconds == 0 {
        Ok(crawl_and_probe(&ctx).await)
    } else {
        tokio::time::timeout(
            Duration::from_secs(config.run_timeout_seconds),
            crawl_and_probe(&ctx),
        )
        .await
    };

    shutdown_gracefully(cancel_token, Some(logging_task)).await;

    let outcome = match crawl_result {
        Ok(outcome) => outcome,
        Err(_) => bail!(
            "Refresh run exceeded its {}s deadline",
            config.run_timeout_seconds
        ),
    };

    let diff = diff_links(&outcome.links.links, &previous);
    let mut new_links: Vec<String> = diff.new.iter().cloned().collect();
    new_links.sort_unstable();
    let mut retained_links: Vec<String> = diff.retained.iter().cloned().collect();
    retained_links.sort_unstable();

    let report = RunReport {
        started_at,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
        root_failure: outcome.playlists.root_failure,
        playlists_found: outcome.playlists.playlists.len(),
        playlist_failures: outcome.movies.failures,
        movie_pages_found: outcome.movies.movie_pages.len(),
        movie_page_failures: outcome.links.failures,
        pages_without_links: outcome.links.pages_without_links,
        links_found: outcome.links.links.len(),
        links_alive: outcome.links_alive,
        failed_links: outcome.failed_links,
        new_links,
        retained_links,
    };

    log_report(&report);
    print_crawl_statistics(&stats);

    // The snapshot is this tool's only persistence. It is replaced wholesale
    // with what this pass discovered, so a root-failed pass writes an empty
    // set; the report's health field is how consumers tell those apart.
    store
        .save(&outcome.links.links)
        .context("Failed to save link snapshot")?;

    let notifier = config
        .webhook_url
        .as_ref()
        .map(|url| WebhookNotifier::new(Arc::clone(&ctx.client), url.clone()));
    deliver_report(notifier.as_ref(), &report).await;

    Ok(report)
}

/// Runs the three crawl stages and the probe stage in order.
async fn crawl_and_probe(ctx: &CrawlContext) -> CrawlOutcome {
    let playlists = discover_playlists(ctx).await;
    info!("Stage 1 complete: {} playlists", playlists.playlists.len());

    let movies = discover_movie_pages(ctx, &playlists.playlists).await;
    info!("Stage 2 complete: {} movie pages", movies.movie_pages.len());

    let links = discover_external_links(ctx, &movies.movie_pages).await;
    info!("Stage 3 complete: {} external links", links.links.len());

    let (links_alive, failed_links) = probe_all(ctx, &links.links).await;
    info!(
        "Stage 4 complete: {} of {} links alive",
        links_alive,
        links.links.len()
    );

    CrawlOutcome {
        playlists,
        movies,
        links,
        links_alive,
        failed_links,
    }
}

/// Probes every discovered link concurrently under the shared semaphore.
async fn probe_all(ctx: &CrawlContext, links: &HashSet<String>) -> (usize, Vec<LinkFailure>) {
    ctx.total.fetch_add(links.len(), Ordering::SeqCst);

    let mut ordered: Vec<String> = links.iter().cloned().collect();
    ordered.sort_unstable();

    let mut tasks = FuturesUnordered::new();
    for url in ordered {
        let permit = match Arc::clone(&ctx.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Semaphore closed, skipping probe: {url}");
                continue;
            }
        };

        let client = Arc::clone(&ctx.client);
        let stats = Arc::clone(&ctx.stats);
        let config = Arc::clone(&ctx.config);
        let completed = Arc::clone(&ctx.completed);

        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            let outcome = probe_link(&client, &url, &config, &stats).await;
            completed.fetch_add(1, Ordering::SeqCst);
            outcome
        }));
    }

    let mut alive = 0;
    let mut failed = Vec::new();
    while let Some(task_result) = tasks.next().await {
        match task_result {
            Ok(outcome) => match outcome.result {
                Ok(_) => alive += 1,
                Err(e) => failed.push(LinkFailure {
                    url: outcome.url,
                    error: e.to_string(),
                }),
            },
            Err(join_error) => {
                error!("Probe task panicked: {:?}", join_error);
            }
        }
    }

    failed.sort_by(|a, b| a.url.cmp(&b.url));
    (alive, failed)
}

fn spawn_progress_logger(
    ctx: &CrawlContext,
    start_time: Instant,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    let completed = Arc::clone(&ctx.completed);
    let total = Arc::clone(&ctx.total);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL as u64));
        // The first tick fires immediately; skip it.
        interval.tick().await;
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = interval.tick() => log_progress(start_time, &completed, &total),
            }
        }
    })
}

fn log_progress(start_time: Instant, completed: &AtomicUsize, total: &AtomicUsize) {
    let elapsed = start_time.elapsed().as_secs_f64();
    let done = completed.load(Ordering::SeqCst);
    let planned = total.load(Ordering::SeqCst);
    let rate = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 };
    info!(
        "Processed {} of {} requests in {:.2} seconds (~{:.2} req/sec)",
        done, planned, elapsed, rate
    );
}

async fn shutdown_gracefully(cancel_token: CancellationToken, logging_task: Option<JoinHandle<()>>) {
    cancel_token.cancel();
    if let Some(task) = logging_task {
        if let Err(e) = task.await {
            warn!("Progress logging task did not shut down cleanly: {:?}", e);
        }
    }
}

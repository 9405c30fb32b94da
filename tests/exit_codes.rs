//! Tests for exit code policies (--fail-on flag)

use chrono::Utc;

use link_refresher::{FailOn, LinkFailure, PageFailure, RunHealth, RunReport};

/// Helper function that mirrors evaluate_exit_code from src/main.rs
fn evaluate_exit_code(fail_on: &FailOn, report: &RunReport) -> i32 {
    match fail_on {
        FailOn::Never => 0,
        FailOn::RootFetch => {
            if report.health() == RunHealth::RootFetchFailed {
                2
            } else {
                0
            }
        }
        FailOn::AnyFailure => {
            if report.has_failures() {
                2
            } else {
                0
            }
        }
    }
}

fn clean_report() -> RunReport {
    RunReport {
        started_at: Utc::now(),
        elapsed_seconds: 1.0,
        root_failure: None,
        playlists_found: 2,
        playlist_failures: Vec::new(),
        movie_pages_found: 3,
        movie_page_failures: Vec::new(),
        pages_without_links: 0,
        links_found: 3,
        links_alive: 3,
        failed_links: Vec::new(),
        new_links: Vec::new(),
        retained_links: vec![
            "https://gofile.io/d/abc".to_string(),
            "https://gofile.io/d/def".to_string(),
            "https://gofile.io/d/ghi".to_string(),
        ],
    }
}

fn root_failed_report() -> RunReport {
    RunReport {
        root_failure: Some(PageFailure {
            url: "https://basharat-movies-hub.onrender.com/".to_string(),
            error: "connection refused".to_string(),
        }),
        playlists_found: 0,
        movie_pages_found: 0,
        links_found: 0,
        links_alive: 0,
        retained_links: Vec::new(),
        ..clean_report()
    }
}

#[test]
fn test_fail_on_never_always_returns_zero() {
    assert_eq!(evaluate_exit_code(&FailOn::Never, &clean_report()), 0);
    assert_eq!(
        evaluate_exit_code(&FailOn::Never, &root_failed_report()),
        0,
        "FailOn::Never should return 0 even for a root failure"
    );
}

#[test]
fn test_fail_on_root_fetch_passes_clean_runs() {
    assert_eq!(evaluate_exit_code(&FailOn::RootFetch, &clean_report()), 0);
}

#[test]
fn test_fail_on_root_fetch_flags_unreachable_root() {
    assert_eq!(
        evaluate_exit_code(&FailOn::RootFetch, &root_failed_report()),
        2,
        "Root fetch failure should exit 2 under the default policy"
    );
}

#[test]
fn test_fail_on_root_fetch_tolerates_page_failures() {
    let mut report = clean_report();
    report.movie_page_failures.push(PageFailure {
        url: "https://basharat-movies-hub.onrender.com/movie/12".to_string(),
        error: "HTTP status 500".to_string(),
    });

    assert_eq!(
        evaluate_exit_code(&FailOn::RootFetch, &report),
        0,
        "A single page failure is not a root failure"
    );
}

#[test]
fn test_fail_on_any_failure_with_failed_link() {
    let mut report = clean_report();
    report.failed_links.push(LinkFailure {
        url: "https://gofile.io/d/abc".to_string(),
        error: "HTTP status 404".to_string(),
    });

    assert_eq!(
        evaluate_exit_code(&FailOn::AnyFailure, &report),
        2,
        "FailOn::AnyFailure should return 2 when any link failed"
    );
}

#[test]
fn test_fail_on_any_failure_with_page_failure() {
    let mut report = clean_report();
    report.playlist_failures.push(PageFailure {
        url: "https://basharat-movies-hub.onrender.com/playlist/2".to_string(),
        error: "HTTP status 404".to_string(),
    });

    assert_eq!(evaluate_exit_code(&FailOn::AnyFailure, &report), 2);
}

#[test]
fn test_fail_on_any_failure_without_failures() {
    assert_eq!(
        evaluate_exit_code(&FailOn::AnyFailure, &clean_report()),
        0,
        "FailOn::AnyFailure should return 0 when nothing failed"
    );
}

#[test]
fn test_pages_without_links_are_not_failures() {
    let mut report = clean_report();
    report.pages_without_links = 3;

    assert_eq!(
        evaluate_exit_code(&FailOn::AnyFailure, &report),
        0,
        "A page with no download link is a warning, not a failure"
    );
}

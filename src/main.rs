//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `link_refresher` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Mapping the run report to an exit code
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use link_refresher::config::WEBHOOK_URL_ENV;
use link_refresher::initialization::init_logger_with;
use link_refresher::{print_run_summary, run_refresh, Config, FailOn, RunHealth, RunReport};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting LINK_REFRESHER_WEBHOOK_URL in .env without exporting it manually
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        // If .env not found in current dir, try next to the executable
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    // Parse command-line arguments into Config
    let mut config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // The CLI flag wins; otherwise fall back to the environment
    if config.webhook_url.is_none() {
        config.webhook_url = std::env::var(WEBHOOK_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty());
    }

    // Run the refresh pass using the library
    match run_refresh(&config).await {
        Ok(report) => {
            print_run_summary(&report);
            let code = evaluate_exit_code(&config.fail_on, &report);
            if code != 0 {
                process::exit(code);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("link_refresher error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Maps a completed pass to an exit code under the configured policy.
///
/// Catastrophic errors exit 1 before this is ever consulted; policy
/// violations exit 2 so schedulers can tell the two apart.
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

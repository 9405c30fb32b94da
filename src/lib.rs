//! link_refresher library: movie-site external-link discovery and refresh
//!
//! This library crawls a movie catalog site in stages (site root → playlist
//! pages → movie detail pages), extracts the embedded file-host links, probes
//! each link for liveness, and diffs the discovered set against the snapshot
//! persisted by the previous run.
//!
//! # Example
//!
//! ```no_run
//! use link_refresher::{run_refresh, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     site_url: "https://basharat-movies-hub.onrender.com".to_string(),
//!     state_file: std::path::PathBuf::from("known_links.txt"),
//!     ..Default::default()
//! };
//!
//! let report = run_refresh(&config).await?;
//! println!("Checked {} links: {} new, {} down",
//!          report.links_found, report.new_links.len(), report.failed_links.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

pub mod config;
mod crawl;
mod diff;
mod error_handling;
mod extract;
mod fetch;
pub mod initialization;
mod notify;
mod probe;
mod report;
mod run;
mod state;

// Re-export public API
pub use config::{Config, FailOn, LogFormat, LogLevel};
pub use crawl::PageFailure;
pub use diff::{diff_links, LinkDiff};
pub use error_handling::{CrawlStats, ErrorType, InfoType, WarningType};
pub use notify::WebhookNotifier;
pub use probe::{probe_link, ProbeError, ProbeOutcome};
pub use report::{print_crawl_statistics, print_run_summary, LinkFailure, RunHealth, RunReport};
pub use run::{run_refresh, run_refresh_with_store};
pub use state::{FileStateStore, LinkStateStore, MemoryStateStore};

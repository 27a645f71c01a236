//! `glone` is a library and command-line tool for downloading a single
//! directory (or a whole tree) from a GitHub or GitLab repository without
//! cloning it.
//!
//! It offers three download strategies, selected by [`config::DownloadMode`]:
//! 1.  **Tree**: walk the host's directory listing API recursively and fetch
//!     every file in parallel on a bounded worker pool.
//! 2.  **Tarball**: fetch one gzip archive of the repository and extract only
//!     the requested subdirectory.
//! 3.  **Files**: fetch a given list of files by their raw URLs.
//!
//! All three share the same skip policy (avoid-list and filter regexes), the
//! same output layout and the same failure model: per-entry errors are
//! collected into a [`RunReport`] while fatal host API errors end the run.
//!
//! # Example: Library Usage
//!
//! ```no_run
//! use glone::{run, CancellationToken, ConfigBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigBuilder::new()
//!     .repo_url("https://github.com/rust-lang/cargo")
//!     .path("src/doc")
//!     .output_dir("cargo-docs")
//!     .filters(vec![r"\.svg$".to_string()])
//!     .build()?;
//!
//! let token = CancellationToken::new();
//! let report = run(&config, &token, None)?;
//! println!("Downloaded {} files", report.files);
//! # Ok(())
//! # }
//! ```

pub mod cancellation;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core_types;
pub mod download;
pub mod errors;
pub mod filtering;
pub mod host;
pub mod layout;
pub mod prelude;
pub mod progress;
pub mod report;
pub mod signal;
pub mod tarball;
pub mod walker;

// Re-export key public types for easier use as a library
pub use cancellation::CancellationToken;
pub use config::{Config, ConfigBuilder, DownloadMode};
pub use errors::{Error, Result};
pub use report::RunReport;

use crate::host::HostClient;
use crate::progress::{NoOpProgress, ProgressReporter};
use std::sync::Arc;

/// Executes one download run with the strategy selected in `config`.
///
/// This is the primary entry point for running the tool's logic programmatically
/// in a way that mirrors the command-line execution. Progress notices go to
/// `progress`; pass `None` (or set `quiet`) to run silently.
///
/// # Returns
/// The [`RunReport`] of a run in which every attempted entry succeeded.
///
/// # Errors
/// * [`Error::HostApi`] if a listing or metadata request fails.
/// * [`Error::Incomplete`] if the run finished but some entries failed; the
///   boxed report lists them.
/// * [`Error::Interrupted`] if `token` was cancelled.
pub fn run(
    config: &Config,
    token: &CancellationToken,
    progress: Option<Arc<dyn ProgressReporter>>,
) -> Result<RunReport> {
    let progress: Arc<dyn ProgressReporter> = match progress {
        Some(reporter) if !config.quiet => reporter,
        _ => Arc::new(NoOpProgress),
    };
    log::debug!("Running with {:?}", config);

    let client = HostClient::new(config)?;
    let result = match &config.mode {
        DownloadMode::Tree => walker::walk_tree(config, &client, progress.as_ref(), token),
        DownloadMode::Tarball => tarball::extract_tarball(config, &client, progress.as_ref(), token),
        DownloadMode::Files(paths) => {
            download::download_files(paths, config, &client, progress.as_ref(), token)
        }
    };
    progress.finish();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_respects_cancelled_token() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config = ConfigBuilder::new()
            .repo_url("owner/repo")
            .branch("main")
            .output_dir(temp_dir.path().join("out").to_string_lossy())
            .build()?;

        let token = CancellationToken::new();
        token.cancel();

        // Cancelled before any request is made.
        let result = run(&config, &token, None);
        assert!(matches!(result, Err(Error::Interrupted)));
        assert!(!temp_dir.path().join("out").exists());
        Ok(())
    }

    #[test]
    fn test_run_cancelled_in_every_mode() -> anyhow::Result<()> {
        let token = CancellationToken::new();
        token.cancel();

        let tarball = ConfigBuilder::new().repo_url("a/b").tarball(true).build()?;
        assert!(matches!(run(&tarball, &token, None), Err(Error::Interrupted)));

        let files = ConfigBuilder::new()
            .repo_url("a/b")
            .files(vec!["README.md".to_string()])
            .build()?;
        assert!(matches!(run(&files, &token, None), Err(Error::Interrupted)));
        Ok(())
    }
}

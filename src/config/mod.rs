//! Defines the core `Config` struct and related types for application configuration.
//!
//! A `Config` is built once by [`ConfigBuilder`], before any request is made,
//! and is read-only afterwards: worker threads share it by reference.

use crate::filtering::SkipPolicy;
use crate::host::{HostAdapter, RepoUrl};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub use builder::ConfigBuilder;
mod builder;
mod parsing;
mod validation;

/// Which download strategy a run uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadMode {
    /// Walk the listing API recursively (default).
    Tree,
    /// Download one tarball and extract the requested path.
    Tarball,
    /// Download only these repository-relative files.
    Files(Vec<String>),
}

/// Settings for one download run.
pub struct Config {
    /// The repository to download from.
    pub repo: RepoUrl,
    /// Host adapter, selected once from the URL or `--host`.
    pub host: HostAdapter,
    /// Local directory everything is written under.
    pub output_dir: PathBuf,
    /// Repository subdirectory to restrict to, without leading or trailing `/`.
    /// Empty for the whole repository.
    pub path: String,
    /// Branch, tag or commit. `None` means the host's default branch.
    pub branch: Option<String>,
    /// Avoid-list and filter regexes.
    pub skip: SkipPolicy,
    /// Suppress per-entry notices.
    pub quiet: bool,
    /// Write entries relative to `path` instead of the repository root.
    pub exclude_path: bool,
    /// Download strategy.
    pub mode: DownloadMode,
    /// Size of the worker pool.
    pub jobs: usize,
    /// Cancel remaining work at the first failed entry.
    pub fail_fast: bool,
    /// Token attached to GitHub API requests.
    pub github_token: Option<String>,
    /// Overall per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

// The token must never end up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("repo", &self.repo.web_url)
            .field("host", &self.host.name())
            .field("output_dir", &self.output_dir)
            .field("path", &self.path)
            .field("branch", &self.branch)
            .field("skip", &self.skip)
            .field("quiet", &self.quiet)
            .field("exclude_path", &self.exclude_path)
            .field("mode", &self.mode)
            .field("jobs", &self.jobs)
            .field("fail_fast", &self.fail_fast)
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

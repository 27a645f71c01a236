// src/config/builder.rs

use super::{
    parsing::{compile_filters, normalize_repo_path, parse_timeout},
    validation::validate_builder_options,
    Config, DownloadMode,
};
use crate::cli::Cli;
use crate::constants::{DEFAULT_JOBS, GITHUB_TOKEN_ENV};
use crate::errors::{ConfigError, Result};
use crate::filtering::SkipPolicy;
use crate::host::{parse_repo_url, HostAdapter, HostKind};
use std::path::PathBuf;

/// A builder for creating a [`Config`] programmatically.
///
/// Every field is optional; `build()` fills in defaults, resolves the
/// repository URL and selects the host adapter.
///
/// # Examples
///
/// ```
/// use glone::config::{ConfigBuilder, DownloadMode};
///
/// let config = ConfigBuilder::new()
///     .repo_url("https://github.com/rust-lang/cargo/tree/master/src/cargo")
///     .filters(vec![r"\.md$".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(config.path, "src/cargo");
/// assert_eq!(config.branch.as_deref(), Some("master"));
/// assert_eq!(config.output_dir.to_str(), Some("cargo"));
/// assert_eq!(config.mode, DownloadMode::Tree);
/// ```
#[derive(Default)]
pub struct ConfigBuilder {
    pub(super) repo_url: Option<String>,
    pub(super) path: Option<String>,
    pub(super) output_dir: Option<String>,
    pub(super) branch: Option<String>,
    pub(super) host_kind: Option<HostKind>,
    pub(super) host: Option<HostAdapter>,
    pub(super) files: Option<Vec<String>>,
    pub(super) tarball: Option<bool>,
    pub(super) avoid: Option<Vec<String>>,
    pub(super) filters: Option<Vec<String>>,
    pub(super) build_mode: Option<bool>,
    pub(super) exclude_path: Option<bool>,
    pub(super) quiet: Option<bool>,
    pub(super) jobs: Option<usize>,
    pub(super) fail_fast: Option<bool>,
    pub(super) timeout_secs: Option<u64>,
    pub(super) github_token: Option<String>,
}

impl ConfigBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from parsed command-line arguments.
    ///
    /// This is also where the GitHub token is read from the environment.
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            repo_url: Some(cli.url),
            path: cli.path,
            output_dir: cli.output,
            branch: cli.branch,
            host_kind: cli.host,
            host: None,
            files: cli.files,
            tarball: Some(cli.tarball),
            avoid: cli.avoid,
            filters: cli.filter,
            build_mode: Some(cli.build),
            exclude_path: Some(cli.exclude_path),
            quiet: Some(cli.quiet),
            jobs: cli.jobs,
            fail_fast: Some(cli.fail_fast),
            timeout_secs: cli.timeout,
            github_token: std::env::var(GITHUB_TOKEN_ENV).ok(),
        }
    }

    /// Repository URL, `owner/repo` shorthand, or a browser `.../tree/...` URL.
    pub fn repo_url(mut self, url: impl Into<String>) -> Self {
        self.repo_url = Some(url.into());
        self
    }
    /// Repository subdirectory to download.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
    /// Local output directory.
    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
    /// Branch, tag or commit.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
    /// Forces the host flavour.
    pub fn host_kind(mut self, kind: HostKind) -> Self {
        self.host_kind = Some(kind);
        self
    }
    /// Uses this adapter as-is, bypassing detection.
    pub fn host(mut self, host: HostAdapter) -> Self {
        self.host = Some(host);
        self
    }
    /// Downloads only these files.
    pub fn files(mut self, files: Vec<String>) -> Self {
        self.files = Some(files);
        self
    }
    /// Uses tarball mode.
    pub fn tarball(mut self, tarball: bool) -> Self {
        self.tarball = Some(tarball);
        self
    }
    /// Exact repository-relative paths to skip.
    pub fn avoid(mut self, avoid: Vec<String>) -> Self {
        self.avoid = Some(avoid);
        self
    }
    /// Regex patterns; matching paths are skipped.
    pub fn filters(mut self, filters: Vec<String>) -> Self {
        self.filters = Some(filters);
        self
    }
    /// Adds the build-mode filter preset.
    pub fn build_mode(mut self, build_mode: bool) -> Self {
        self.build_mode = Some(build_mode);
        self
    }
    /// Writes entries relative to the requested path.
    pub fn exclude_path(mut self, exclude_path: bool) -> Self {
        self.exclude_path = Some(exclude_path);
        self
    }
    /// Suppresses notices.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = Some(quiet);
        self
    }
    /// Worker pool size.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }
    /// Stops at the first failed entry.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = Some(fail_fast);
        self
    }
    /// Per-request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
    /// Token for GitHub API requests.
    pub fn github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    /// Validates the options and builds the final `Config`.
    ///
    /// Explicit `path` and `branch` take precedence over the hints carried by a
    /// `.../tree/<branch>/<path>` URL.
    ///
    /// # Errors
    /// Returns [`ConfigError`] (wrapped in [`crate::errors::Error`]) for an
    /// unusable URL, an invalid filter regex, or conflicting options.
    pub fn build(self) -> Result<Config> {
        validate_builder_options(&self)?;

        let url = self.repo_url.ok_or_else(|| ConfigError::InvalidValue {
            option: "URL".to_string(),
            reason: "a repository URL is required".to_string(),
        })?;
        let repo = parse_repo_url(&url)?;

        let path = self
            .path
            .or_else(|| repo.path_hint.clone())
            .map(|p| normalize_repo_path(&p))
            .unwrap_or_default();

        let branch = self
            .branch
            .filter(|b| !b.trim().is_empty())
            .or_else(|| repo.branch_hint.clone());

        let output_dir = self
            .output_dir
            .filter(|o| !o.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&repo.name));

        let filters = compile_filters(
            self.filters.unwrap_or_default(),
            self.build_mode.unwrap_or(false),
        )?;
        let skip = SkipPolicy::new(self.avoid.unwrap_or_default(), filters);

        let mode = match self.files {
            Some(files) => DownloadMode::Files(
                files
                    .into_iter()
                    .map(|f| normalize_repo_path(&f))
                    .filter(|f| !f.is_empty())
                    .collect(),
            ),
            None if self.tarball.unwrap_or(false) => DownloadMode::Tarball,
            None => DownloadMode::Tree,
        };

        let host = match (self.host, self.host_kind) {
            (Some(host), _) => host,
            (None, Some(kind)) => HostAdapter::from_kind(kind),
            (None, None) => HostAdapter::detect(&repo),
        };
        log::debug!("Using {} adapter for {}", host.name(), repo.web_url);

        Ok(Config {
            repo,
            host,
            output_dir,
            path,
            branch,
            skip,
            quiet: self.quiet.unwrap_or(false),
            exclude_path: self.exclude_path.unwrap_or(false),
            mode,
            jobs: self.jobs.unwrap_or(DEFAULT_JOBS),
            fail_fast: self.fail_fast.unwrap_or(false),
            github_token: self.github_token.filter(|t| !t.trim().is_empty()),
            timeout: parse_timeout(self.timeout_secs),
        })
    }
}

// src/host/mod.rs
//! Host adapters: translate a repository URL, branch and path into the URLs
//! the download strategies need, one variant per hosting API.
//!
//! The adapter is chosen once, when the configuration is built, and never
//! re-dispatched per call. [`HostAdapter`] dereferences to the [`GitHost`]
//! capability trait, so callers write `config.host.listing_url(...)`.

mod client;
mod github;
mod gitlab;
mod url;

pub use self::url::{parse_repo_url, RepoUrl};
pub use client::{Auth, HostClient};
pub use github::GitHub;
pub use gitlab::GitLab;

use crate::core_types::Entry;
use crate::errors::HostApiError;
use std::fmt;
use std::ops::Deref;

/// The operations every hosting provider supports.
pub trait GitHost: Send + Sync + fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// API endpoint listing the children of `path` (`""` for the root).
    fn listing_url(&self, repo: &RepoUrl, path: &str) -> String;

    /// Pins a listing or tarball URL to `branch`. No-op when `branch` is `None`
    /// or empty.
    fn apply_branch(&self, url: &str, branch: Option<&str>) -> String {
        with_ref_param(url, branch)
    }

    /// Queries repository metadata for the default branch.
    fn default_branch(&self, client: &HostClient, repo: &RepoUrl) -> Result<String, HostApiError>;

    /// Direct content URL of one file.
    fn raw_file_url(&self, repo: &RepoUrl, branch: &str, path: &str) -> String;

    /// Fetches and decodes one directory listing, following pagination.
    fn fetch_listing(
        &self,
        client: &HostClient,
        repo: &RepoUrl,
        branch: Option<&str>,
        listing_url: &str,
    ) -> Result<Vec<Entry>, HostApiError>;

    /// URL of a gzip tarball of the whole repository at `branch`.
    fn tarball_url(&self, repo: &RepoUrl, branch: &str) -> String;

    /// Credentials policy for this host's API requests.
    fn api_auth(&self) -> Auth;

    /// Whether listings can only be decoded with a concrete branch.
    fn listing_needs_branch(&self) -> bool {
        false
    }
}

/// Selects a [`HostAdapter`] explicitly (`--host`).
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Github,
    Gitlab,
}

/// The closed set of supported hosts.
#[derive(Debug, Clone)]
pub enum HostAdapter {
    GitHub(GitHub),
    GitLab(GitLab),
}

impl HostAdapter {
    /// Picks the adapter from the repository's host name. Anything that is not
    /// recognizably GitLab is treated as GitHub.
    pub fn detect(repo: &RepoUrl) -> Self {
        if repo.host.contains("gitlab") {
            HostAdapter::GitLab(GitLab)
        } else {
            HostAdapter::GitHub(GitHub::default())
        }
    }

    /// Builds the default adapter for an explicitly requested host.
    pub fn from_kind(kind: HostKind) -> Self {
        match kind {
            HostKind::Github => HostAdapter::GitHub(GitHub::default()),
            HostKind::Gitlab => HostAdapter::GitLab(GitLab),
        }
    }
}

impl Deref for HostAdapter {
    type Target = dyn GitHost;

    fn deref(&self) -> &Self::Target {
        match self {
            HostAdapter::GitHub(github) => github,
            HostAdapter::GitLab(gitlab) => gitlab,
        }
    }
}

/// Appends `/`-separated `parts` to `base` as percent-encoded path segments,
/// so names containing `#`, `?` or `%` survive as part of the path.
pub(crate) fn join_path(base: &str, parts: &[&str]) -> String {
    let segments = parts
        .iter()
        .flat_map(|part| part.split('/'))
        .filter(|segment| !segment.is_empty());

    match ::url::Url::parse(base) {
        Ok(mut url) => {
            if let Ok(mut path) = url.path_segments_mut() {
                path.pop_if_empty().extend(segments);
            }
            url.to_string()
        }
        Err(e) => {
            log::warn!("Could not parse base URL '{}': {}", base, e);
            let tail: Vec<&str> = segments.collect();
            format!("{}/{}", base.trim_end_matches('/'), tail.join("/"))
        }
    }
}

/// Sets the `ref` query parameter, replacing any existing one.
pub(crate) fn with_ref_param(url: &str, branch: Option<&str>) -> String {
    let Some(branch) = branch.filter(|b| !b.is_empty()) else {
        return url.to_string();
    };

    match ::url::Url::parse(url) {
        Ok(mut parsed) => {
            let kept: Vec<(String, String)> = parsed
                .query_pairs()
                .filter(|(key, _)| key != "ref")
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            {
                let mut query = parsed.query_pairs_mut();
                query.clear();
                for (key, value) in &kept {
                    query.append_pair(key, value);
                }
                query.append_pair("ref", branch);
            }
            parsed.to_string()
        }
        Err(e) => {
            log::warn!("Could not parse '{}' to pin branch: {}", url, e);
            let base = url.split("?ref=").next().unwrap_or(url);
            format!("{}?ref={}", base, branch)
        }
    }
}

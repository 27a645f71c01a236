// src/filtering/mod.rs

//! The skip policy shared by the tree walker, the tarball extractor and the
//! specific-files downloader.
//!
//! A path is skipped when it is listed verbatim in the avoid-list, or when any
//! filter regex matches somewhere inside it. Regexes are not anchored: `test`
//! skips `src/test_utils.rs` as well as `test/`.

use crate::config::Config;
use crate::progress::ProgressReporter;
use regex::Regex;
use std::fmt;

/// Why an entry was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The path is in the avoid-list.
    Avoided,
    /// The path matched the filter with this pattern.
    Filtered(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Avoided => write!(f, "Avoided"),
            SkipReason::Filtered(pattern) => write!(f, "Regex '{}' matched", pattern),
        }
    }
}

/// Exact-path avoid-list plus an ordered list of filter regexes.
#[derive(Debug, Clone, Default)]
pub struct SkipPolicy {
    avoid: Vec<String>,
    filters: Vec<Regex>,
}

impl SkipPolicy {
    /// Builds a policy. Trailing slashes on avoid-list paths are ignored.
    pub fn new(avoid: Vec<String>, filters: Vec<Regex>) -> Self {
        let avoid = avoid
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { avoid, filters }
    }

    /// The normalized avoid-list.
    pub fn avoid(&self) -> &[String] {
        &self.avoid
    }

    /// The filter regexes, in the order they are tested.
    pub fn filters(&self) -> &[Regex] {
        &self.filters
    }

    /// Decides whether `relative_path` is excluded, without side effects.
    ///
    /// # Examples
    ///
    /// ```
    /// use glone::filtering::{SkipPolicy, SkipReason};
    /// use regex::Regex;
    ///
    /// let policy = SkipPolicy::new(
    ///     vec!["docs".to_string()],
    ///     vec![Regex::new(r"\.md$").unwrap()],
    /// );
    /// assert_eq!(policy.check("docs"), Some(SkipReason::Avoided));
    /// assert!(matches!(policy.check("src/README.md"), Some(SkipReason::Filtered(_))));
    /// assert_eq!(policy.check("src/main.rs"), None);
    /// ```
    pub fn check(&self, relative_path: &str) -> Option<SkipReason> {
        let path = relative_path.trim_end_matches('/');

        if self.avoid.iter().any(|avoided| avoided == path) {
            return Some(SkipReason::Avoided);
        }

        self.filters
            .iter()
            .find(|filter| filter.is_match(path))
            .map(|filter| SkipReason::Filtered(filter.as_str().to_string()))
    }

    /// Checks every ancestor of `relative_path`, outermost first, then the
    /// path itself. Returns the first excluded path and why.
    ///
    /// ```
    /// use glone::filtering::{SkipPolicy, SkipReason};
    ///
    /// let policy = SkipPolicy::new(vec!["src".to_string()], vec![]);
    /// assert_eq!(
    ///     policy.check_with_ancestors("src/lib/mod.rs"),
    ///     Some(("src", SkipReason::Avoided))
    /// );
    /// assert_eq!(policy.check_with_ancestors("docs/src"), None);
    /// ```
    pub fn check_with_ancestors<'a>(&self, relative_path: &'a str) -> Option<(&'a str, SkipReason)> {
        let path = relative_path.trim_matches('/');
        path.match_indices('/')
            .map(|(i, _)| &path[..i])
            .chain(std::iter::once(path))
            .filter(|p| !p.is_empty())
            .find_map(|p| self.check(p).map(|reason| (p, reason)))
    }
}

/// Applies the configured skip policy and reports the skip.
///
/// Returns `true` if the entry must be dropped. Filter matches are announced
/// through `progress`; avoid-list hits are only logged, since the user named
/// those paths explicitly.
pub fn should_skip(relative_path: &str, config: &Config, progress: &dyn ProgressReporter) -> bool {
    match config.skip.check(relative_path) {
        Some(SkipReason::Avoided) => {
            log::debug!("Avoiding '{}'", relative_path);
            true
        }
        Some(reason) => {
            progress.skipped(relative_path, &reason);
            true
        }
        None => false,
    }
}

/// Like [`should_skip`], but also drops `relative_path` when one of its
/// ancestor directories is excluded.
pub fn should_skip_with_ancestors(
    relative_path: &str,
    config: &Config,
    progress: &dyn ProgressReporter,
) -> bool {
    match config.skip.check_with_ancestors(relative_path) {
        Some((path, SkipReason::Avoided)) => {
            log::debug!("Avoiding '{}' (under '{}')", relative_path, path);
            true
        }
        Some((path, reason)) => {
            progress.skipped(path, &reason);
            true
        }
        None => false,
    }
}

/// Returns `true` if the requested `config.path` is excluded, directly or
/// through an ancestor, so nothing beneath it may be written.
pub fn target_is_skipped(config: &Config, progress: &dyn ProgressReporter) -> bool {
    if config.path.is_empty() || !should_skip_with_ancestors(&config.path, config, progress) {
        return false;
    }
    log::info!("'{}' is excluded by the skip policy, nothing to download", config.path);
    true
}

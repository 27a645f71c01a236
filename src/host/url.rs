//! Handles parsing of repository URLs.

use crate::errors::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// A repository location, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUrl {
    /// Browser URL of the repository, e.g. `https://github.com/owner/repo`.
    pub web_url: String,
    /// Scheme, host and port, e.g. `https://github.com`.
    pub origin: String,
    /// Host name only, e.g. `github.com`.
    pub host: String,
    /// Namespace and project, e.g. `owner/repo` or `group/subgroup/repo`.
    pub full_path: String,
    /// Project name, the last segment of `full_path`.
    pub name: String,
    /// Branch taken from a `.../tree/<branch>/...` URL, if any.
    pub branch_hint: Option<String>,
    /// Subdirectory taken from a `.../tree/<branch>/<path>` URL, if any.
    pub path_hint: Option<String>,
}

/// `owner/repo` shorthand, expanded to a GitHub URL.
static SHORTHAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").unwrap());

/// Parses a repository URL as typed by the user.
///
/// Accepts full `http(s)` URLs, scheme-less `github.com/...` or
/// `gitlab.com/...` URLs, and `owner/repo` shorthand for GitHub. Browser URLs
/// pointing into a tree (`.../tree/<branch>/<path>` on GitHub,
/// `.../-/tree/<branch>/<path>` on GitLab) yield branch and path hints.
///
/// # Examples
/// ```
/// use glone::host::parse_repo_url;
///
/// let repo = parse_repo_url("https://github.com/rust-lang/cargo/tree/master/src/cargo").unwrap();
/// assert_eq!(repo.web_url, "https://github.com/rust-lang/cargo");
/// assert_eq!(repo.name, "cargo");
/// assert_eq!(repo.branch_hint.as_deref(), Some("master"));
/// assert_eq!(repo.path_hint.as_deref(), Some("src/cargo"));
///
/// let short = parse_repo_url("BrewingWeasel/radish").unwrap();
/// assert_eq!(short.web_url, "https://github.com/BrewingWeasel/radish");
/// ```
pub fn parse_repo_url(input: &str) -> Result<RepoUrl, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        url: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("empty URL"));
    }

    let expanded = if trimmed.contains("://") {
        trimmed.to_string()
    } else if trimmed.starts_with("github.com/") || trimmed.starts_with("gitlab.com/") {
        format!("https://{}", trimmed)
    } else if SHORTHAND_RE.is_match(trimmed) {
        format!("https://github.com/{}", trimmed)
    } else {
        return Err(invalid("expected a URL or <owner>/<repo>"));
    };

    let url = Url::parse(&expanded).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(invalid("only http and https URLs are supported"));
    }
    let host = url
        .host_str()
        .ok_or_else(|| invalid("missing host"))?
        .to_string();

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let (repo_segments, branch_hint, path_hint) = split_tree_segments(&segments);
    if repo_segments.len() < 2 {
        return Err(invalid("expected <owner>/<repo> in the path"));
    }

    let mut repo_segments: Vec<&str> = repo_segments.to_vec();
    if let Some(last) = repo_segments.last_mut() {
        *last = last.trim_end_matches(".git");
    }
    let full_path = repo_segments.join("/");
    let name = repo_segments[repo_segments.len() - 1].to_string();
    let origin = url.origin().ascii_serialization();

    log::debug!(
        "Parsed repository URL: origin={}, path={}, branch_hint={:?}, path_hint={:?}",
        origin,
        full_path,
        branch_hint,
        path_hint
    );

    Ok(RepoUrl {
        web_url: format!("{}/{}", origin, full_path),
        origin,
        host,
        full_path,
        name,
        branch_hint,
        path_hint,
    })
}

/// Separates `<repo...>/[-/]tree/<branch>/<path...>` into its parts.
fn split_tree_segments<'a>(
    segments: &'a [&'a str],
) -> (&'a [&'a str], Option<String>, Option<String>) {
    // GitLab: group/sub/repo/-/tree/branch/path
    if let Some(dash) = segments.iter().position(|s| *s == "-") {
        if segments.get(dash + 1) == Some(&"tree") {
            return tree_parts(&segments[..dash], &segments[dash + 2..]);
        }
        return (&segments[..dash], None, None);
    }
    // GitHub: owner/repo/tree/branch/path
    if segments.len() > 3 && segments[2] == "tree" {
        return tree_parts(&segments[..2], &segments[3..]);
    }
    (segments, None, None)
}

fn tree_parts<'a>(
    repo: &'a [&'a str],
    rest: &[&str],
) -> (&'a [&'a str], Option<String>, Option<String>) {
    let branch = rest.first().map(|b| b.to_string());
    let path = if rest.len() > 1 {
        Some(rest[1..].join("/"))
    } else {
        None
    };
    (repo, branch, path)
}

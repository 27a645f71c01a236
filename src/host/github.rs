//! GitHub REST API adapter (contents API, raw.githubusercontent.com, tarballs).

use super::client::{decode_body, Auth, HostClient};
use super::{join_path, GitHost, RepoUrl};
use crate::core_types::{Entry, EntryKind, ListingItem, OneOrMany, RepoInfo};
use crate::errors::HostApiError;

const API_BASE: &str = "https://api.github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com";

/// GitHub adapter. Base URLs are configurable so tests can use a local server.
#[derive(Debug, Clone)]
pub struct GitHub {
    api_base: String,
    raw_base: String,
}

impl Default for GitHub {
    fn default() -> Self {
        Self::with_base_urls(API_BASE, RAW_BASE)
    }
}

impl GitHub {
    /// Creates an adapter talking to the given API and raw-content hosts.
    ///
    /// # Examples
    /// ```
    /// use glone::host::{parse_repo_url, GitHost, GitHub};
    ///
    /// let github = GitHub::with_base_urls("http://127.0.0.1:9000", "http://127.0.0.1:9000/raw");
    /// let repo = parse_repo_url("https://github.com/a/b").unwrap();
    /// assert_eq!(
    ///     github.listing_url(&repo, "src"),
    ///     "http://127.0.0.1:9000/repos/a/b/contents/src"
    /// );
    /// ```
    pub fn with_base_urls(api_base: &str, raw_base: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            raw_base: raw_base.trim_end_matches('/').to_string(),
        }
    }

    fn repo_api(&self, repo: &RepoUrl) -> String {
        format!("{}/repos/{}", self.api_base, repo.full_path)
    }
}

impl GitHost for GitHub {
    fn name(&self) -> &'static str {
        "github"
    }

    fn listing_url(&self, repo: &RepoUrl, path: &str) -> String {
        join_path(&self.repo_api(repo), &["contents", path])
    }

    fn default_branch(&self, client: &HostClient, repo: &RepoUrl) -> Result<String, HostApiError> {
        let url = self.repo_api(repo);
        log::debug!("Fetching default branch for {}", repo.full_path);
        let info: RepoInfo = client.get_json(&url, self.api_auth())?;
        Ok(info.default_branch)
    }

    fn raw_file_url(&self, repo: &RepoUrl, branch: &str, path: &str) -> String {
        join_path(&self.raw_base, &[repo.full_path.as_str(), branch, path])
    }

    fn fetch_listing(
        &self,
        client: &HostClient,
        repo: &RepoUrl,
        _branch: Option<&str>,
        listing_url: &str,
    ) -> Result<Vec<Entry>, HostApiError> {
        let items = client.get_json_pages(listing_url, self.api_auth(), |url, response| {
            decode_body::<OneOrMany<ListingItem>>(url, response).map(OneOrMany::into_vec)
        })?;

        let entries = items
            .into_iter()
            .filter_map(ListingItem::into_entry)
            .filter_map(|mut entry| match entry.kind {
                EntryKind::Directory => {
                    if entry.listing_url.is_none() {
                        entry.listing_url = Some(self.listing_url(repo, &entry.path));
                    }
                    Some(entry)
                }
                EntryKind::File if entry.download_url.is_none() => {
                    log::warn!("Skipping file with no download_url: {}", entry.path);
                    None
                }
                EntryKind::File => Some(entry),
            })
            .collect();
        Ok(entries)
    }

    fn tarball_url(&self, repo: &RepoUrl, branch: &str) -> String {
        join_path(&self.repo_api(repo), &["tarball", branch])
    }

    fn api_auth(&self) -> Auth {
        Auth::GitHubToken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::parse_repo_url;

    fn repo() -> RepoUrl {
        parse_repo_url("https://github.com/BrewingWeasel/radish").unwrap()
    }

    #[test]
    fn test_listing_url() {
        let gh = GitHub::default();
        assert_eq!(
            gh.listing_url(&repo(), ""),
            "https://api.github.com/repos/BrewingWeasel/radish/contents"
        );
        assert_eq!(
            gh.listing_url(&repo(), "/src/lib/"),
            "https://api.github.com/repos/BrewingWeasel/radish/contents/src/lib"
        );
    }

    #[test]
    fn test_apply_branch_pins_ref() {
        let gh = GitHub::default();
        let url = gh.apply_branch(&gh.listing_url(&repo(), "src"), Some("dev"));
        assert_eq!(
            url,
            "https://api.github.com/repos/BrewingWeasel/radish/contents/src?ref=dev"
        );
    }

    #[test]
    fn test_raw_and_tarball_urls() {
        let gh = GitHub::default();
        assert_eq!(
            gh.raw_file_url(&repo(), "main", "src/main.rs"),
            "https://raw.githubusercontent.com/BrewingWeasel/radish/main/src/main.rs"
        );
        assert_eq!(
            gh.tarball_url(&repo(), "main"),
            "https://api.github.com/repos/BrewingWeasel/radish/tarball/main"
        );
    }

    #[test]
    fn test_base_urls_trailing_slash_trimmed() {
        let gh = GitHub::with_base_urls("http://localhost:1/", "http://localhost:2/");
        assert_eq!(
            gh.raw_file_url(&repo(), "b", "f"),
            "http://localhost:2/BrewingWeasel/radish/b/f"
        );
        assert_eq!(gh.api_auth(), Auth::GitHubToken);
    }

    #[test]
    fn test_paths_are_percent_encoded() {
        let gh = GitHub::default();
        assert_eq!(
            gh.raw_file_url(&repo(), "main", "docs/issue#1 (draft)?.md"),
            "https://raw.githubusercontent.com/BrewingWeasel/radish/main/docs/issue%231%20(draft)%3F.md"
        );
        assert_eq!(
            gh.listing_url(&repo(), "100%/src"),
            "https://api.github.com/repos/BrewingWeasel/radish/contents/100%25/src"
        );
    }
}

//! GitLab REST API adapter (repository tree API, `/-/raw/` URLs, archives).
//!
//! The tree API only returns `path` and `type`, so every decoded entry gets its
//! listing and download URLs filled in here.

use super::client::{decode_body, Auth, HostClient};
use super::{join_path, GitHost, RepoUrl};
use crate::constants::LISTING_PAGE_SIZE;
use crate::core_types::{Entry, EntryKind, ListingItem, RepoInfo};
use crate::errors::HostApiError;
use url::form_urlencoded::byte_serialize;

/// GitLab adapter, for gitlab.com and self-hosted instances alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitLab;

impl GitLab {
    /// `<origin>/api/v4/projects/<url-encoded full path>`
    fn project_api(&self, repo: &RepoUrl) -> String {
        format!(
            "{}/api/v4/projects/{}",
            repo.origin,
            repo.full_path.replace('/', "%2F")
        )
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

impl GitHost for GitLab {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    fn listing_url(&self, repo: &RepoUrl, path: &str) -> String {
        format!(
            "{}/repository/tree?path={}&per_page={}",
            self.project_api(repo),
            encode(path.trim_matches('/')),
            LISTING_PAGE_SIZE
        )
    }

    fn default_branch(&self, client: &HostClient, repo: &RepoUrl) -> Result<String, HostApiError> {
        log::debug!("Fetching default branch for {}", repo.full_path);
        let info: RepoInfo = client.get_json(&self.project_api(repo), self.api_auth())?;
        Ok(info.default_branch)
    }

    fn raw_file_url(&self, repo: &RepoUrl, branch: &str, path: &str) -> String {
        join_path(&repo.web_url, &["-", "raw", branch, path])
    }

    fn fetch_listing(
        &self,
        client: &HostClient,
        repo: &RepoUrl,
        branch: Option<&str>,
        listing_url: &str,
    ) -> Result<Vec<Entry>, HostApiError> {
        let branch = branch.unwrap_or_else(|| {
            log::warn!("No branch resolved for GitLab listing; raw URLs will use HEAD");
            "HEAD"
        });
        let items = client.get_json_pages(listing_url, self.api_auth(), |url, response| {
            decode_body::<Vec<ListingItem>>(url, response)
        })?;

        let entries = items
            .into_iter()
            .filter_map(ListingItem::into_entry)
            .map(|mut entry| {
                match entry.kind {
                    EntryKind::Directory => {
                        entry.listing_url = Some(self.listing_url(repo, &entry.path));
                    }
                    EntryKind::File => {
                        entry.download_url = Some(self.raw_file_url(repo, branch, &entry.path));
                    }
                }
                entry
            })
            .collect();
        Ok(entries)
    }

    fn tarball_url(&self, repo: &RepoUrl, branch: &str) -> String {
        format!(
            "{}/repository/archive.tar.gz?sha={}",
            self.project_api(repo),
            encode(branch)
        )
    }

    fn api_auth(&self) -> Auth {
        Auth::Anonymous
    }

    fn listing_needs_branch(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::parse_repo_url;

    fn repo() -> RepoUrl {
        parse_repo_url("https://gitlab.com/group/sub/proj").unwrap()
    }

    #[test]
    fn test_listing_url_encodes_project_and_path() {
        assert_eq!(
            GitLab.listing_url(&repo(), "src/utils"),
            "https://gitlab.com/api/v4/projects/group%2Fsub%2Fproj/repository/tree?path=src%2Futils&per_page=100"
        );
        assert_eq!(
            GitLab.listing_url(&repo(), ""),
            "https://gitlab.com/api/v4/projects/group%2Fsub%2Fproj/repository/tree?path=&per_page=100"
        );
    }

    #[test]
    fn test_apply_branch_adds_ref_to_query() {
        let url = GitLab.apply_branch(&GitLab.listing_url(&repo(), "src"), Some("main"));
        assert!(url.ends_with("?path=src&per_page=100&ref=main"), "{}", url);
    }

    #[test]
    fn test_raw_and_tarball_urls() {
        assert_eq!(
            GitLab.raw_file_url(&repo(), "main", "src/main.go"),
            "https://gitlab.com/group/sub/proj/-/raw/main/src/main.go"
        );
        assert_eq!(
            GitLab.tarball_url(&repo(), "release/1.0"),
            "https://gitlab.com/api/v4/projects/group%2Fsub%2Fproj/repository/archive.tar.gz?sha=release%2F1.0"
        );
        assert_eq!(GitLab.api_auth(), Auth::Anonymous);
    }

    #[test]
    fn test_raw_url_encodes_reserved_characters() {
        assert_eq!(
            GitLab.raw_file_url(&repo(), "main", "docs/issue#1.md"),
            "https://gitlab.com/group/sub/proj/-/raw/main/docs/issue%231.md"
        );
    }
}

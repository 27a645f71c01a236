//! Defines the entry model shared by the host adapters and the tree walker.
//!
//! An [`Entry`] is one element of a directory listing. Hosts describe entries
//! with slightly different vocabularies; [`ListingItem`] is the raw decoded
//! form and [`ListingItem::into_entry`] normalizes it.

use serde::Deserialize;

/// Whether a listing entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One child of a remote directory, with the locator needed to fetch it.
///
/// # Examples
///
/// ```
/// use glone::core_types::{Entry, EntryKind};
///
/// let entry = Entry {
///     path: "src/main.go".to_string(),
///     listing_url: None,
///     download_url: Some("https://raw.githubusercontent.com/o/r/main/src/main.go".to_string()),
///     kind: EntryKind::File,
/// };
/// assert_eq!(entry.kind, EntryKind::File);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// API URL listing this entry's children. Set for directories.
    pub listing_url: Option<String>,
    /// Direct content URL. Set for files.
    pub download_url: Option<String>,
    /// File or directory.
    pub kind: EntryKind,
}

/// A listing element exactly as the host API returns it.
///
/// GitHub's contents API fills every field; GitLab's tree API only returns
/// `path` and `type`, so the URL fields are optional here.
#[derive(Deserialize, Debug, Clone)]
pub struct ListingItem {
    pub path: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
}

impl ListingItem {
    /// Maps the host's type vocabulary onto [`EntryKind`].
    ///
    /// Returns `None` for entries without downloadable content, such as
    /// submodules.
    pub fn kind(&self) -> Option<EntryKind> {
        match self.item_type.as_str() {
            "dir" | "tree" => Some(EntryKind::Directory),
            "file" | "blob" | "symlink" => Some(EntryKind::File),
            _ => None,
        }
    }

    /// Converts the raw item into an [`Entry`], dropping unsupported kinds.
    pub fn into_entry(self) -> Option<Entry> {
        let Some(kind) = self.kind() else {
            log::warn!(
                "Skipping '{}' of unsupported type '{}'",
                self.path,
                self.item_type
            );
            return None;
        };
        let (listing_url, download_url) = match kind {
            EntryKind::Directory => (self.url, None),
            EntryKind::File => (None, self.download_url),
        };
        Some(Entry {
            path: self.path,
            listing_url,
            download_url,
            kind,
        })
    }
}

/// A listing body is an array, except that GitHub answers with a single
/// object when the requested path is a file.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Repository metadata, only read for the default branch.
#[derive(Deserialize, Debug)]
pub(crate) struct RepoInfo {
    pub default_branch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_github_listing() {
        let body = r#"[
            {"path": "src", "url": "https://api/contents/src?ref=main", "download_url": null, "type": "dir"},
            {"path": "README.md", "url": "https://api/contents/README.md?ref=main",
             "download_url": "https://raw/README.md", "type": "file"}
        ]"#;
        let items: OneOrMany<ListingItem> = serde_json::from_str(body).unwrap();
        let entries: Vec<Entry> = items
            .into_vec()
            .into_iter()
            .filter_map(ListingItem::into_entry)
            .collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(
            entries[0].listing_url.as_deref(),
            Some("https://api/contents/src?ref=main")
        );
        assert!(entries[0].download_url.is_none());
        assert_eq!(entries[1].kind, EntryKind::File);
        assert_eq!(
            entries[1].download_url.as_deref(),
            Some("https://raw/README.md")
        );
    }

    #[test]
    fn test_decode_single_object_listing() {
        let body = r#"{"path": "go/example.go", "download_url": "https://raw/x", "type": "file"}"#;
        let items: OneOrMany<ListingItem> = serde_json::from_str(body).unwrap();
        let items = items.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, "go/example.go");
    }

    #[test]
    fn test_gitlab_vocabulary() {
        let body = r#"[
            {"id": "a1", "name": "lib", "type": "tree", "path": "src/lib", "mode": "040000"},
            {"id": "b2", "name": "main.go", "type": "blob", "path": "src/main.go", "mode": "100644"},
            {"id": "c3", "name": "vendored", "type": "commit", "path": "vendored", "mode": "160000"}
        ]"#;
        let items: Vec<ListingItem> = serde_json::from_str(body).unwrap();
        assert_eq!(items[0].kind(), Some(EntryKind::Directory));
        assert_eq!(items[1].kind(), Some(EntryKind::File));
        assert_eq!(items[2].kind(), None);

        let entries: Vec<Entry> = items.into_iter().filter_map(ListingItem::into_entry).collect();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_submodule_is_dropped() {
        let item = ListingItem {
            path: "deps/sub".to_string(),
            url: None,
            download_url: None,
            item_type: "submodule".to_string(),
        };
        assert!(item.into_entry().is_none());
    }
}

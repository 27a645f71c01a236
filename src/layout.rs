//! Target layout: where a repository-relative path lands on disk.
//!
//! Both download strategies resolve output paths here, so `--exclude-path`
//! and the traversal guard behave identically in tree and tarball mode.

use crate::config::Config;
use crate::core_types::EntryKind;
use crate::errors::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Resolves the local destination of a repository entry.
///
/// The result is `output_dir` joined with the entry path, minus the requested
/// subdirectory when `exclude_path` is set. If stripping leaves nothing (the
/// requested path itself), a directory maps to `output_dir` and a file keeps
/// its file name.
///
/// # Errors
/// Returns [`Error::UnsafePath`] if any segment is `..` or otherwise not a
/// plain name, so no entry can be written outside of `output_dir`.
///
/// # Examples
/// ```
/// use glone::config::ConfigBuilder;
/// use glone::core_types::EntryKind;
/// use glone::layout::output_path;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .repo_url("https://github.com/a/b")
///     .path("src")
///     .output_dir("out")
///     .exclude_path(true)
///     .build()
///     .unwrap();
/// assert_eq!(
///     output_path(&config, "src/lib/util.go", EntryKind::File).unwrap(),
///     PathBuf::from("out/lib/util.go")
/// );
/// ```
pub fn output_path(config: &Config, repo_relative: &str, kind: EntryKind) -> Result<PathBuf> {
    let full = repo_relative.trim_matches('/');
    let mut relative = if config.exclude_path {
        strip_requested_prefix(full, &config.path)
    } else {
        full
    };

    if relative.is_empty() && kind == EntryKind::File {
        relative = full.rsplit('/').next().unwrap_or(full);
    }

    let mut out = config.output_dir.clone();
    for segment in relative.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(Error::UnsafePath(repo_relative.to_string())),
            name if is_plain_name(name) => out.push(name),
            _ => return Err(Error::UnsafePath(repo_relative.to_string())),
        }
    }
    Ok(out)
}

/// Removes `prefix` (a `/`-separated directory path) from the front of `path`,
/// matching whole segments only.
pub fn strip_requested_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return path;
    }
    if path == prefix {
        return "";
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => path,
    }
}

fn is_plain_name(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

//! Tarball mode: download one gzip archive of the repository and extract only
//! the requested subtree.
//!
//! Host archives wrap everything in a synthetic root directory
//! (`owner-repo-<sha>/`), usually preceded by a pax global header. The root is
//! replaced by the output directory, and the requested path is located with a
//! [`TargetCursor`] so the scan can stop as soon as the subtree has passed.

use crate::cancellation::CancellationToken;
use crate::config::Config;
use crate::core_types::EntryKind;
use crate::download::resolve_branch;
use crate::errors::{fs_error, Error, Result};
use crate::filtering::{should_skip, target_is_skipped};
use crate::host::HostClient;
use crate::layout::output_path;
use crate::progress::ProgressReporter;
use crate::report::{FailedEntry, Outcome, RunReport};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tar::{Archive, EntryType};

/// Where the scan stands relative to the requested subtree.
///
/// Archive order keeps a directory's contents contiguous, so once an entry
/// outside the target follows one inside it, nothing further can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCursor {
    /// No entry of the target has been seen yet.
    NotYetEntered,
    /// The last entry was inside the target.
    InsideTarget,
    /// The target has been passed; the scan is over.
    Left,
}

impl TargetCursor {
    /// Moves the cursor for the next entry, given whether it lies in the target.
    pub fn advance(self, inside: bool) -> Self {
        match (self, inside) {
            (TargetCursor::Left, _) => TargetCursor::Left,
            (TargetCursor::NotYetEntered, false) => TargetCursor::NotYetEntered,
            (TargetCursor::InsideTarget, false) => TargetCursor::Left,
            (_, true) => TargetCursor::InsideTarget,
        }
    }
}

/// Returns `true` if `path` is `dir` or lies beneath it, comparing whole
/// segments. An empty `dir` contains everything.
pub(crate) fn is_within(path: &str, dir: &str) -> bool {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        return true;
    }
    match path.strip_prefix(dir) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Strips the archive's root directory name from `path`.
/// Returns `None` for the root itself or for paths outside of it.
fn strip_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    path.strip_prefix(root)?
        .strip_prefix('/')
        .filter(|rest| !rest.is_empty())
}

/// Downloads the repository tarball and extracts `config.path` from it.
///
/// The branch is `config.branch` if set, otherwise the host's default branch.
///
/// # Errors
/// * [`Error::HostApi`] if the default branch cannot be resolved.
/// * [`Error::Transport`] if the tarball request fails.
/// * [`Error::Archive`] if the stream is not a readable gzip tar.
/// * [`Error::Interrupted`] and [`Error::Incomplete`] as for tree mode.
pub fn extract_tarball(
    config: &Config,
    client: &HostClient,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<RunReport> {
    if token.is_cancelled() {
        return Err(Error::Interrupted);
    }
    if target_is_skipped(config, progress) {
        return Ok(skipped_target());
    }

    let branch = resolve_branch(config, client)?;
    let url = config.host.tarball_url(&config.repo, &branch);
    log::info!("Fetching tarball of {} at {}", config.repo.full_path, branch);

    progress.downloading(&url);
    let response = client
        .get(&url, config.host.api_auth())
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|source| Error::Transport {
            url: url.clone(),
            source,
        })?;
    progress.message(format!("Downloaded tarball from {}", url));

    extract_stream(response, config, progress, token)
}

fn skipped_target() -> RunReport {
    RunReport {
        skipped: 1,
        ..RunReport::default()
    }
}

/// Extracts the requested subtree of a gzip tar stream into `config.output_dir`.
///
/// Paths are matched, filtered and laid out relative to the archive's root
/// directory. Symlinks, hard links and special files are not extracted. If
/// `config.path` or one of its parents is excluded, the stream is not read.
///
/// # Errors
/// Returns [`Error::Archive`] if the stream cannot be decoded, and otherwise
/// behaves like [`extract_tarball`].
pub fn extract_archive<R: Read>(
    reader: R,
    config: &Config,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<RunReport> {
    if target_is_skipped(config, progress) {
        return Ok(skipped_target());
    }
    extract_stream(reader, config, progress, token)
}

fn extract_stream<R: Read>(
    reader: R,
    config: &Config,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<RunReport> {
    fs::create_dir_all(&config.output_dir).map_err(|e| fs_error(e, &config.output_dir))?;

    let mut archive = Archive::new(GzDecoder::new(reader));
    let entries = archive
        .entries()
        .map_err(|source| Error::Archive { source })?;

    let mut report = RunReport::default();
    let mut root: Option<String> = None;
    let mut cursor = TargetCursor::NotYetEntered;
    let mut skipped_dirs: Vec<String> = Vec::new();

    for entry in entries {
        if token.is_cancelled() {
            return Err(Error::Interrupted);
        }
        let mut entry = entry.map_err(|source| Error::Archive { source })?;
        let entry_type = entry.header().entry_type();
        if matches!(entry_type, EntryType::XGlobalHeader | EntryType::XHeader) {
            log::debug!("Skipping pax metadata record");
            continue;
        }

        let raw_path = String::from_utf8_lossy(&entry.path_bytes())
            .trim_matches('/')
            .to_string();

        let root_name = root
            .get_or_insert_with(|| {
                let first = raw_path.split('/').next().unwrap_or_default().to_string();
                log::debug!("Archive root directory is '{}'", first);
                first
            })
            .as_str();
        let Some(relative) = strip_root(&raw_path, root_name).map(str::to_string) else {
            if raw_path != root_name {
                log::warn!("Entry '{}' lies outside the archive root, skipping", raw_path);
            }
            continue;
        };

        cursor = cursor.advance(is_within(&relative, &config.path));
        match cursor {
            TargetCursor::NotYetEntered => continue,
            TargetCursor::Left => {
                log::debug!("Passed '{}', stopping the archive scan", config.path);
                break;
            }
            TargetCursor::InsideTarget => {}
        }

        if skipped_dirs.iter().any(|dir| is_within(&relative, dir)) {
            log::debug!("'{}' is under a skipped directory", relative);
            continue;
        }
        if should_skip(&relative, config, progress) {
            report.record(Outcome::Skipped);
            if entry_type.is_dir() {
                skipped_dirs.push(relative);
            }
            continue;
        }

        let result = match entry_type {
            EntryType::Directory => extract_directory(config, &relative),
            EntryType::Regular | EntryType::Continuous => {
                extract_file(config, &relative, &mut entry, progress)
            }
            other => {
                log::debug!("Skipping {:?} entry '{}'", other, relative);
                continue;
            }
        };

        match result {
            Ok(outcome) => report.record(outcome),
            Err(error) => {
                log::warn!("Failed '{}': {}", relative, error);
                report.record(Outcome::Failed(FailedEntry {
                    path: relative,
                    error,
                }));
                if config.fail_fast {
                    break;
                }
            }
        }
    }

    if cursor == TargetCursor::NotYetEntered && !config.path.is_empty() {
        log::warn!("Path '{}' was not found in the archive", config.path);
    }
    report.into_result()
}

fn extract_directory(config: &Config, relative: &str) -> Result<Outcome> {
    let dest = output_path(config, relative, EntryKind::Directory)?;
    fs::create_dir_all(&dest).map_err(|e| fs_error(e, &dest))?;
    Ok(Outcome::Directory)
}

fn extract_file<R: Read>(
    config: &Config,
    relative: &str,
    contents: &mut R,
    progress: &dyn ProgressReporter,
) -> Result<Outcome> {
    let dest = output_path(config, relative, EntryKind::File)?;
    let bytes = write_file(contents, &dest)?;
    progress.extracted(&dest);
    Ok(Outcome::File { bytes })
}

fn write_file<R: Read>(contents: &mut R, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_error(e, parent))?;
    }
    let mut file = File::create(dest).map_err(|e| fs_error(e, dest))?;
    io::copy(contents, &mut file).map_err(|e| fs_error(e, dest))
}

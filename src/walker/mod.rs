//! Recursive download of a remote directory through the host's listing API.
//!
//! Every directory level is one `rayon::scope`: the listing is fetched, files
//! are spawned as download tasks, subdirectories as nested walks, and the scope
//! only returns once all of them finished. The top-level call returning
//! therefore means the whole subtree is on disk.

use crate::cancellation::CancellationToken;
use crate::config::Config;
use crate::core_types::{Entry, EntryKind};
use crate::download::{download_entry, worker_pool};
use crate::errors::{fs_error, Error, HostApiError, Result};
use crate::filtering::{should_skip, target_is_skipped};
use crate::host::HostClient;
use crate::layout::output_path;
use crate::progress::ProgressReporter;
use crate::report::{outcome_channel, Outcome, OutcomeSink, RunReport};
use std::fs;
use std::sync::Mutex;

/// Everything a walk task needs, shared by reference across the pool.
struct WalkContext<'a> {
    config: &'a Config,
    client: &'a HostClient,
    progress: &'a dyn ProgressReporter,
    branch: Option<&'a str>,
    sink: OutcomeSink,
    /// Ctrl+C.
    token: &'a CancellationToken,
    /// Fatal errors and `--fail-fast`.
    abort: CancellationToken,
    fatal: Mutex<Option<HostApiError>>,
}

impl WalkContext<'_> {
    fn stopped(&self) -> bool {
        self.token.is_cancelled() || self.abort.is_cancelled()
    }

    /// Keeps the first fatal error and stops scheduling work. The error itself
    /// is reported by the caller once the walk has joined.
    fn record_fatal(&self, error: HostApiError) {
        log::debug!("Listing failed, stopping the walk");
        if let Ok(mut slot) = self.fatal.lock() {
            slot.get_or_insert(error);
        }
        self.abort.cancel();
    }

    fn entry_failed(&self, path: &str, error: Error) {
        self.sink.failed(path, error);
        if self.config.fail_fast {
            self.abort.cancel();
        }
    }
}

/// Downloads `config.path` (or the whole repository) by walking the listing
/// API, mirroring the remote tree under `config.output_dir`.
///
/// Per-entry failures are collected and the walk continues; with
/// `config.fail_fast` the first failure stops all pending work instead.
///
/// # Errors
/// * [`Error::HostApi`] if any listing (or the default branch lookup) fails.
/// * [`Error::Interrupted`] if `token` was cancelled.
/// * [`Error::Incomplete`] if some entries could not be written.
/// * [`Error::Filesystem`] if the output directory itself cannot be created.
pub fn walk_tree(
    config: &Config,
    client: &HostClient,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<RunReport> {
    if token.is_cancelled() {
        return Err(Error::Interrupted);
    }
    if target_is_skipped(config, progress) {
        return Ok(RunReport {
            skipped: 1,
            ..RunReport::default()
        });
    }

    let branch = match &config.branch {
        Some(branch) => Some(branch.clone()),
        None if config.host.listing_needs_branch() => {
            Some(config.host.default_branch(client, &config.repo)?)
        }
        None => None,
    };
    match &branch {
        Some(b) => log::info!("Walking '{}' on branch {}", config.repo.full_path, b),
        None => log::info!("Walking '{}' on the default branch", config.repo.full_path),
    }

    fs::create_dir_all(&config.output_dir).map_err(|e| fs_error(e, &config.output_dir))?;

    let pool = worker_pool(config.jobs)?;
    let (sink, collector) = outcome_channel();
    let ctx = WalkContext {
        config,
        client,
        progress,
        branch: branch.as_deref(),
        sink,
        token,
        abort: CancellationToken::new(),
        fatal: Mutex::new(None),
    };

    let root_url = config.host.listing_url(&config.repo, &config.path);
    pool.install(|| walk_dir(&ctx, &root_url, &config.path));

    let WalkContext { sink, fatal, .. } = ctx;
    drop(sink);

    if token.is_cancelled() {
        return Err(Error::Interrupted);
    }
    if let Some(error) = fatal.into_inner().ok().flatten() {
        return Err(Error::HostApi(error));
    }
    collector.finish().into_result()
}

/// Lists one directory and processes its children, returning once every
/// spawned task (including nested walks) has finished.
fn walk_dir(ctx: &WalkContext<'_>, listing_url: &str, dir_path: &str) {
    if ctx.stopped() {
        return;
    }

    let url = ctx.config.host.apply_branch(listing_url, ctx.branch);
    let entries = {
        let _span = tracing::debug_span!("listing", path = %dir_path).entered();
        ctx.config
            .host
            .fetch_listing(ctx.client, &ctx.config.repo, ctx.branch, &url)
    };
    let entries = match entries {
        Ok(entries) => entries,
        Err(e) => {
            ctx.record_fatal(e);
            return;
        }
    };
    log::debug!("'{}' lists {} entries", dir_path, entries.len());

    rayon::scope(|s| {
        for entry in entries {
            if ctx.stopped() {
                break;
            }
            if should_skip(&entry.path, ctx.config, ctx.progress) {
                ctx.sink.send(Outcome::Skipped);
                continue;
            }
            match entry.kind {
                EntryKind::Directory => {
                    if let Some(listing_url) = create_directory(ctx, &entry) {
                        s.spawn(move |_| walk_dir(ctx, &listing_url, &entry.path));
                    }
                }
                EntryKind::File => {
                    s.spawn(move |_| download(ctx, &entry));
                }
            }
        }
    });
}

/// Creates the local directory for `entry` before its children are listed.
/// Returns the URL to list it with, or `None` if it could not be created.
fn create_directory(ctx: &WalkContext<'_>, entry: &Entry) -> Option<String> {
    let dest = match output_path(ctx.config, &entry.path, EntryKind::Directory) {
        Ok(dest) => dest,
        Err(e) => {
            ctx.entry_failed(&entry.path, e);
            return None;
        }
    };
    if let Err(e) = fs::create_dir_all(&dest) {
        ctx.entry_failed(&entry.path, fs_error(e, &dest));
        return None;
    }
    ctx.sink.send(Outcome::Directory);

    Some(entry.listing_url.clone().unwrap_or_else(|| {
        ctx.config
            .host
            .listing_url(&ctx.config.repo, &entry.path)
    }))
}

fn download(ctx: &WalkContext<'_>, entry: &Entry) {
    if ctx.stopped() {
        return;
    }
    let Some(url) = entry.download_url.as_deref() else {
        log::warn!("No download URL for '{}', skipping", entry.path);
        return;
    };
    download_entry(
        ctx.client,
        url,
        &entry.path,
        ctx.config,
        ctx.progress,
        &ctx.sink,
        &ctx.abort,
    );
}

//! Single-file downloads, the worker pool they run on, and specific-files mode.

use crate::cancellation::CancellationToken;
use crate::config::Config;
use crate::core_types::EntryKind;
use crate::errors::{fs_error, Error, HostApiError, Result};
use crate::filtering::should_skip_with_ancestors;
use crate::host::{Auth, HostClient};
use crate::layout::output_path;
use crate::progress::ProgressReporter;
use crate::report::{outcome_channel, Outcome, OutcomeSink, RunReport};
use anyhow::Context;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Downloads `url` into `dest`, overwriting any existing file.
///
/// Missing parent directories are created first. Raw file URLs are fetched
/// without credentials. Returns the number of bytes written.
///
/// # Errors
/// Returns [`Error::Transport`] if the request fails, the host answers with a
/// non-success status, or the body cannot be read, and [`Error::Filesystem`]
/// if the destination cannot be created or written.
pub fn download_file(
    client: &HostClient,
    url: &str,
    dest: &Path,
    progress: &dyn ProgressReporter,
) -> Result<u64> {
    progress.downloading(url);

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| fs_error(e, parent))?;
        }
    }

    let transport = |source| Error::Transport {
        url: url.to_string(),
        source,
    };
    let mut response = client
        .get(url, Auth::Anonymous)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(transport)?;

    // Only touch the destination once the host has answered with content.
    let mut file = File::create(dest).map_err(|e| fs_error(e, dest))?;
    let bytes = response.copy_to(&mut file).map_err(transport)?;
    file.flush().map_err(|e| fs_error(e, dest))?;

    log::debug!("Wrote {} bytes to {}", bytes, dest.display());
    progress.downloaded(dest, bytes);
    Ok(bytes)
}

/// Builds the bounded pool that listing fetches and downloads run on.
pub(crate) fn worker_pool(jobs: usize) -> Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("glone-worker-{}", i))
        .build()
        .context("Failed to build the download worker pool")?;
    Ok(pool)
}

/// Downloads one file as a pool task and records the outcome.
///
/// Entry-local failures go to `sink`; with `fail_fast` the first one also
/// cancels `abort` so no further work is scheduled.
pub(crate) fn download_entry(
    client: &HostClient,
    url: &str,
    repo_path: &str,
    config: &Config,
    progress: &dyn ProgressReporter,
    sink: &OutcomeSink,
    abort: &CancellationToken,
) {
    let result = output_path(config, repo_path, EntryKind::File)
        .and_then(|dest| download_file(client, url, &dest, progress));
    match result {
        Ok(bytes) => sink.send(Outcome::File { bytes }),
        Err(e) => {
            sink.failed(repo_path, e);
            if config.fail_fast {
                abort.cancel();
            }
        }
    }
}

/// Picks the branch for modes that need a concrete one up front.
///
/// `config.branch` already holds `--branch` or, failing that, the branch named
/// in the URL. Without either, the host is asked for its default branch.
pub(crate) fn resolve_branch(
    config: &Config,
    client: &HostClient,
) -> std::result::Result<String, HostApiError> {
    if let Some(branch) = &config.branch {
        log::debug!("Using configured branch: {}", branch);
        return Ok(branch.clone());
    }
    log::debug!("Fetching default branch for {}", config.repo.full_path);
    config.host.default_branch(client, &config.repo)
}

/// Downloads only the given repository-relative files.
///
/// Each path goes through the skip policy, ancestors included, then is fetched from the host's raw
/// file URL on the worker pool. Failures are collected like in tree mode.
///
/// # Errors
/// Returns [`Error::HostApi`] if the default branch cannot be resolved,
/// [`Error::Interrupted`] on Ctrl+C, and [`Error::Incomplete`] if any file
/// failed.
pub fn download_files(
    paths: &[String],
    config: &Config,
    client: &HostClient,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<RunReport> {
    if token.is_cancelled() {
        return Err(Error::Interrupted);
    }

    let branch = resolve_branch(config, client)?;
    log::info!("Downloading {} file(s) on branch {}", paths.len(), branch);

    fs::create_dir_all(&config.output_dir).map_err(|e| fs_error(e, &config.output_dir))?;

    let pool = worker_pool(config.jobs)?;
    let (sink, collector) = outcome_channel();
    let abort = CancellationToken::new();

    pool.install(|| {
        paths.par_iter().for_each(|path| {
            if token.is_cancelled() || abort.is_cancelled() {
                return;
            }
            if should_skip_with_ancestors(path, config, progress) {
                sink.send(Outcome::Skipped);
                return;
            }
            let url = config.host.raw_file_url(&config.repo, &branch, path);
            download_entry(client, &url, path, config, progress, &sink, &abort);
        });
    });
    drop(sink);

    if token.is_cancelled() {
        return Err(Error::Interrupted);
    }
    collector.finish().into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoOpProgress;
    use crate::ConfigBuilder;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HostClient {
        let config = ConfigBuilder::new().repo_url("a/b").build().unwrap();
        HostClient::new(&config).unwrap()
    }

    #[test]
    fn test_download_file_creates_parents_and_overwrites() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/raw/main.go"))
                .respond_with(ResponseTemplate::new(200).set_body_string("package main\n"))
                .mount(&server),
        );

        let dir = tempdir().unwrap();
        let dest = dir.path().join("nested/src/main.go");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, "stale contents that are longer than the new body").unwrap();

        let url = format!("{}/raw/main.go", server.uri());
        let bytes = download_file(&client(), &url, &dest, &NoOpProgress).unwrap();

        assert_eq!(bytes, 13);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "package main\n");
    }

    #[test]
    fn test_download_file_status_error_leaves_no_file() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(404))
                .mount(&server),
        );

        let dir = tempdir().unwrap();
        let dest = dir.path().join("missing.txt");
        let url = format!("{}/raw/missing.txt", server.uri());
        let err = download_file(&client(), &url, &dest, &NoOpProgress).unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_worker_pool_threads_are_named() {
        let pool = worker_pool(2).unwrap();
        let name = pool.install(|| std::thread::current().name().map(str::to_string));
        assert!(name.unwrap().starts_with("glone-worker-"));
    }
}

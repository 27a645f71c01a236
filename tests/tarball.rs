// tests/tarball.rs

mod common;

use common::{tar_gz, MockHost};
use glone::progress::NoOpProgress;
use glone::tarball::extract_archive;
use glone::{run, CancellationToken, ConfigBuilder, Error};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const ROOT: &str = "owner-repo-abc123";

fn sample_archive() -> Vec<u8> {
    tar_gz(
        ROOT,
        &[
            ("README.md", Some("# repo\n")),
            ("src", None),
            ("src/main.go", Some("package main\n")),
            ("src/utils", None),
            ("src/utils/a.go", Some("package utils // a\n")),
            ("src/utils/deep", None),
            ("src/utils/deep/b.go", Some("package deep\n")),
            ("src/utils2", None),
            ("src/utils2/c.go", Some("package utils2\n")),
            ("zzz.txt", Some("last\n")),
        ],
    )
}

fn builder(out: &Path) -> ConfigBuilder {
    ConfigBuilder::new()
        .repo_url("owner/repo")
        .output_dir(out.to_string_lossy())
        .tarball(true)
        .quiet(true)
}

fn extract(config: &glone::Config) -> glone::Result<glone::RunReport> {
    let archive = sample_archive();
    extract_archive(
        archive.as_slice(),
        config,
        &NoOpProgress,
        &CancellationToken::new(),
    )
}

#[test]
fn test_restricts_to_requested_subdirectory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let out = temp.path().join("repo");

    let report = extract(&builder(&out).path("src/utils").build()?)?;

    assert_eq!(
        fs::read_to_string(out.join("src/utils/a.go"))?,
        "package utils // a\n"
    );
    assert!(out.join("src/utils/deep/b.go").is_file());
    // Siblings before and after the target are left alone.
    assert!(!out.join("src/main.go").exists());
    assert!(!out.join("src/utils2").exists());
    assert!(!out.join("README.md").exists());
    assert!(!out.join("zzz.txt").exists());
    // The synthetic root never appears on disk.
    assert!(!out.join(ROOT).exists());
    assert_eq!(report.files, 2);
    Ok(())
}

#[test]
fn test_whole_repository_replaces_root() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let out = temp.path().join("repo");

    let report = extract(&builder(&out).build()?)?;

    assert!(out.join("README.md").is_file());
    assert!(out.join("src/utils2/c.go").is_file());
    assert!(out.join("zzz.txt").is_file());
    assert!(!out.join("pax_global_header").exists());
    assert_eq!(report.files, 6);
    assert_eq!(report.directories, 4);
    Ok(())
}

#[test]
fn test_exclude_path_with_tarball() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let out = temp.path().join("repo");

    extract(
        &builder(&out)
            .path("src/utils")
            .exclude_path(true)
            .build()?,
    )?;

    assert!(out.join("a.go").is_file());
    assert!(out.join("deep/b.go").is_file());
    assert!(!out.join("src").exists());
    Ok(())
}

#[test]
fn test_build_mode_and_skipped_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let out = temp.path().join("repo");

    let report = extract(
        &builder(&out)
            .build_mode(true)
            .avoid(vec!["src/utils".to_string()])
            .build()?,
    )?;

    assert!(!out.join("README.md").exists());
    assert!(out.join("src/main.go").is_file());
    // Everything beneath an avoided directory is suppressed.
    assert!(!out.join("src/utils").exists());
    assert!(out.join("src/utils2/c.go").is_file());
    assert_eq!(report.skipped, 2);
    Ok(())
}

#[test]
fn test_missing_path_extracts_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let out = temp.path().join("repo");

    let report = extract(&builder(&out).path("docs").build()?)?;

    assert_eq!(report.attempted(), 0);
    assert!(fs::read_dir(&out)?.next().is_none());
    Ok(())
}

#[test]
fn test_corrupt_stream_is_archive_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config = builder(&temp.path().join("repo")).build()?;

    let result = extract_archive(
        &b"definitely not gzip"[..],
        &config,
        &NoOpProgress,
        &CancellationToken::new(),
    );

    assert!(matches!(result, Err(Error::Archive { .. })));
    Ok(())
}

#[test]
fn test_tarball_mode_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let host = MockHost::start();
    host.mount(
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/tarball/dev"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(sample_archive())),
    );
    let temp = tempdir()?;
    let out = temp.path().join("repo");

    let config = builder(&out)
        .host(host.github())
        .branch("dev")
        .path("src/utils")
        .build()?;
    let report = run(&config, &CancellationToken::new(), None)?;

    assert_eq!(report.files, 2);
    assert!(out.join("src/utils/deep/b.go").is_file());
    Ok(())
}

#[test]
fn test_tarball_uses_default_branch() -> Result<(), Box<dyn std::error::Error>> {
    let host = MockHost::start();
    host.mount(
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "default_branch": "trunk" })),
            ),
    );
    host.mount(
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/tarball/trunk"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(sample_archive())),
    );
    let temp = tempdir()?;
    let out = temp.path().join("repo");

    let config = builder(&out).host(host.github()).build()?;
    run(&config, &CancellationToken::new(), None)?;

    assert!(out.join("zzz.txt").is_file());
    Ok(())
}

/// Makes `src/utils/a.go` unwritable by putting a directory in its place.
fn block_first_file(out: &Path) -> std::io::Result<()> {
    fs::create_dir_all(out.join("src/utils/a.go"))
}

#[test]
fn test_failed_entry_does_not_stop_extraction() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let out = temp.path().join("repo");
    block_first_file(&out)?;

    let result = extract(&builder(&out).path("src/utils").build()?);

    match result {
        Err(Error::Incomplete(report)) => {
            assert_eq!(report.failures.len(), 1);
            assert_eq!(report.failures[0].path, "src/utils/a.go");
            assert!(matches!(report.failures[0].error, Error::Filesystem { .. }));
            assert_eq!(report.files, 1);
        }
        other => panic!("Expected Error::Incomplete, got {:?}", other),
    }
    assert!(out.join("src/utils/deep/b.go").is_file());
    Ok(())
}

#[test]
fn test_fail_fast_stops_extraction() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let out = temp.path().join("repo");
    block_first_file(&out)?;

    let result = extract(&builder(&out).path("src/utils").fail_fast(true).build()?);

    match result {
        Err(Error::Incomplete(report)) => {
            assert_eq!(report.failures.len(), 1);
            assert_eq!(report.files, 0);
        }
        other => panic!("Expected Error::Incomplete, got {:?}", other),
    }
    assert!(!out.join("src/utils/deep").exists());
    Ok(())
}

#[test]
fn test_avoided_ancestor_of_requested_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let out = temp.path().join("repo");

    let report = extract(
        &builder(&out)
            .path("src/utils")
            .avoid(vec!["src".to_string()])
            .build()?,
    )?;

    assert_eq!(report.files, 0);
    assert_eq!(report.skipped, 1);
    assert!(!out.join("src").exists());
    Ok(())
}

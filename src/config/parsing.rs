// src/config/parsing.rs

use crate::constants::BUILD_MODE_FILTERS;
use crate::errors::ConfigError;
use regex::Regex;
use std::time::Duration;

/// Compiles `--filter` patterns, followed by the `--build` preset if requested.
///
/// Preset entries are literal names, so they are escaped before compiling.
pub(super) fn compile_filters(
    patterns: Vec<String>,
    build_mode: bool,
) -> Result<Vec<Regex>, ConfigError> {
    let preset = BUILD_MODE_FILTERS
        .iter()
        .filter(|_| build_mode)
        .map(|name| regex::escape(name));

    patterns
        .into_iter()
        .chain(preset)
        .map(|pattern| {
            Regex::new(&pattern).map_err(|source| ConfigError::InvalidRegex { pattern, source })
        })
        .collect()
}

/// Normalizes a repository subdirectory: no surrounding slashes, no `./`.
pub(super) fn normalize_repo_path(path: &str) -> String {
    path.trim()
        .trim_start_matches("./")
        .trim_matches('/')
        .to_string()
}

/// Converts `--timeout` seconds into a `Duration`.
pub(super) fn parse_timeout(seconds: Option<u64>) -> Option<Duration> {
    seconds.map(Duration::from_secs)
}

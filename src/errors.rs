//! Defines the error types used by `glone`.
//!
//! Errors are split by how far they reach. A [`HostApiError`] means the shape of
//! the remote tree cannot be known and ends the run. Transport and filesystem
//! errors belong to a single entry: the download strategies record them in the
//! [`RunReport`](crate::report::RunReport) and keep going.

use crate::report::RunReport;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type for a `glone` run.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration could not be built.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A listing or metadata request to the host API failed. Fatal for the run.
    #[error(transparent)]
    HostApi(#[from] HostApiError),

    /// Fetching a single file or the archive failed.
    #[error("Failed to fetch '{url}': {source}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// The underlying `reqwest` error (connection, status or body read).
        #[source]
        source: reqwest::Error,
    },

    /// Creating a directory or writing a file failed.
    #[error("Failed to write '{path}': {source}")]
    Filesystem {
        /// The local path that could not be created or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The downloaded archive stream could not be read.
    #[error("Failed to read archive stream: {source}")]
    Archive {
        #[source]
        source: std::io::Error,
    },

    /// A remote entry path would resolve outside of the output directory.
    #[error("Refusing to write entry with unsafe path '{0}'")]
    UnsafePath(String),

    /// The operation was cancelled by the user (Ctrl+C).
    #[error("Operation cancelled by user (Ctrl+C)")]
    Interrupted,

    /// The run finished but some entries could not be downloaded.
    #[error("{} of {} entries failed to download", .0.failures.len(), .0.attempted())]
    Incomplete(Box<RunReport>),

    /// Any other error (e.g. building the HTTP client or worker pool).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while talking to a host's listing or metadata API.
#[derive(Error, Debug)]
pub enum HostApiError {
    /// The request could not be sent or the body could not be read.
    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The host answered with a non-success status.
    #[error("Host API returned HTTP {status} for '{url}'")]
    Status { url: String, status: u16 },

    /// The response body was not the JSON shape we expected.
    #[error("Could not decode the response from '{url}': {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl HostApiError {
    /// Returns `true` when the failure looks like API rate limiting.
    ///
    /// GitHub answers unauthenticated clients that ran out of quota with 403 (or
    /// 429), and some proxies answer with an HTML page that fails to decode.
    pub fn is_rate_limit_plausible(&self) -> bool {
        match self {
            HostApiError::Status { status, .. } => *status == 403 || *status == 429,
            HostApiError::Decode { .. } => true,
            HostApiError::Request { .. } => false,
        }
    }
}

/// Errors raised while building a [`Config`](crate::config::Config).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The repository URL could not be understood.
    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A `--filter` pattern failed to compile.
    #[error("Invalid filter regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An option carries a value outside its allowed range.
    #[error("Invalid value for {option}: {reason}")]
    InvalidValue { option: String, reason: String },

    /// Two options cannot be used together.
    #[error("Cannot use {option1} and {option2} simultaneously.")]
    Conflict { option1: String, option2: String },
}

/// Wraps an I/O error with the path it happened on.
pub fn fs_error<P: AsRef<Path>>(source: std::io::Error, path: P) -> Error {
    Error::Filesystem {
        path: path.as_ref().to_path_buf(),
        source,
    }
}

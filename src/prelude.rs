//! The `glone` prelude for convenient library usage.
//!
//! This module re-exports the most commonly used types, traits, and functions
//! from the `glone` library.
//!
//! # Example
//!
//! ```no_run
//! use glone::prelude::*;
//! # fn main() -> Result<()> {
//!
//! let config = ConfigBuilder::new().repo_url("owner/repo").path("src").build()?;
//! let token = CancellationToken::new();
//! let report = run(&config, &token, None)?;
//! println!("{} files", report.files);
//!
//! # Ok(())
//! # }
//! ```

pub use crate::cancellation::CancellationToken;
pub use crate::config::{Config, ConfigBuilder, DownloadMode};
pub use crate::core_types::{Entry, EntryKind};
pub use crate::download::{download_file, download_files};
pub use crate::errors::{Error, Result};
pub use crate::filtering::{SkipPolicy, SkipReason};
pub use crate::host::{parse_repo_url, GitHost, HostAdapter, HostKind, RepoUrl};
pub use crate::progress::{ConsoleProgress, NoOpProgress, ProgressReporter};
pub use crate::report::{write_summary, FailedEntry, RunReport};
pub use crate::run;
pub use crate::tarball::{extract_archive, extract_tarball};
pub use crate::walker::walk_tree;

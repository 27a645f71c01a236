// src/progress.rs

//! Defines the seam through which download notices reach the user.
//!
//! The engine reports every download, extraction and skip to a
//! [`ProgressReporter`]. Notices are cosmetic: they never influence whether a
//! run succeeds. Quiet runs use [`NoOpProgress`].

use crate::filtering::SkipReason;
use console::style;
#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Receives per-entry notices from the download strategies.
///
/// # Examples
///
/// ```
/// use glone::filtering::SkipReason;
/// use glone::progress::ProgressReporter;
/// use std::path::Path;
/// use std::sync::Mutex;
///
/// // A reporter that only remembers what was skipped.
/// #[derive(Default)]
/// struct SkipLog {
///     skipped: Mutex<Vec<String>>,
/// }
/// impl ProgressReporter for SkipLog {
///     fn downloading(&self, _url: &str) {}
///     fn downloaded(&self, _path: &Path, _bytes: u64) {}
///     fn extracted(&self, _path: &Path) {}
///     fn skipped(&self, path: &str, _reason: &SkipReason) {
///         self.skipped.lock().unwrap().push(path.to_string());
///     }
///     fn message(&self, _msg: String) {}
///     fn finish(&self) {}
/// }
///
/// let reporter = SkipLog::default();
/// reporter.skipped("LICENSE", &SkipReason::Avoided);
/// assert_eq!(*reporter.skipped.lock().unwrap(), vec!["LICENSE".to_string()]);
/// ```
pub trait ProgressReporter: Send + Sync {
    /// A file download is starting.
    fn downloading(&self, url: &str);
    /// A file was fully written.
    fn downloaded(&self, path: &Path, bytes: u64);
    /// An archive entry was written.
    fn extracted(&self, path: &Path);
    /// An entry was excluded by the skip policy.
    fn skipped(&self, path: &str, reason: &SkipReason);
    /// A free-form informational notice.
    fn message(&self, msg: String);
    /// The run is over; tear down any live display.
    fn finish(&self);
}

/// A `ProgressReporter` that does nothing. Used for `--quiet`.
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    fn downloading(&self, _url: &str) {}
    fn downloaded(&self, _path: &Path, _bytes: u64) {}
    fn extracted(&self, _path: &Path) {}
    fn skipped(&self, _path: &str, _reason: &SkipReason) {}
    fn message(&self, _msg: String) {}
    fn finish(&self) {}
}

/// Prints one coloured line per notice to stdout.
///
/// Downloads are blue, completed files green, skips red.
pub struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn downloading(&self, url: &str) {
        println!("{} {}", style("Downloading").blue(), url);
    }

    fn downloaded(&self, path: &Path, _bytes: u64) {
        println!("{} {}", style("Downloaded").green(), path.display());
    }

    fn extracted(&self, path: &Path) {
        println!("{} {}", style("Extracted").green(), path.display());
    }

    fn skipped(&self, path: &str, reason: &SkipReason) {
        println!("{}", style(format!("{}, skipping: {}", reason, path)).red());
    }

    fn message(&self, msg: String) {
        println!("{}", style(msg).green());
    }

    fn finish(&self) {}
}

/// A spinner counting finished files, with skips printed above it.
#[cfg(feature = "progress")]
pub struct IndicatifProgress {
    bar: ProgressBar,
}

#[cfg(feature = "progress")]
impl IndicatifProgress {
    /// Creates a spinner with the default style.
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }
}

#[cfg(feature = "progress")]
impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "progress")]
impl ProgressReporter for IndicatifProgress {
    fn downloading(&self, url: &str) {
        self.bar.set_message(url.to_string());
    }

    fn downloaded(&self, path: &Path, _bytes: u64) {
        self.bar.inc(1);
        self.bar.set_message(path.display().to_string());
    }

    fn extracted(&self, path: &Path) {
        self.bar.inc(1);
        self.bar.set_message(path.display().to_string());
    }

    fn skipped(&self, path: &str, reason: &SkipReason) {
        self.bar.println(
            style(format!("{}, skipping: {}", reason, path))
                .yellow()
                .to_string(),
        );
    }

    fn message(&self, msg: String) {
        self.bar.println(msg);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

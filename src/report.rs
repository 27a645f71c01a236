// src/report.rs

//! Collects per-entry outcomes into a [`RunReport`] and prints its summary.

use crate::errors::Error;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use std::io::Write;

/// One entry that could not be downloaded or written.
#[derive(Debug)]
pub struct FailedEntry {
    /// Repository-relative path of the entry.
    pub path: String,
    /// What went wrong.
    pub error: Error,
}

/// Totals for a finished run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files written to disk.
    pub files: usize,
    /// Directories created.
    pub directories: usize,
    /// Entries excluded by the skip policy.
    pub skipped: usize,
    /// Bytes written across all files.
    pub bytes: u64,
    /// Entries that failed, in completion order.
    pub failures: Vec<FailedEntry>,
}

impl RunReport {
    /// Number of entries that were attempted (written or failed).
    pub fn attempted(&self) -> usize {
        self.files + self.directories + self.failures.len()
    }

    /// Returns `true` if no entry failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turns a report with failures into [`Error::Incomplete`].
    pub fn into_result(self) -> Result<RunReport, Error> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(Error::Incomplete(Box::new(self)))
        }
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::File { bytes } => {
                self.files += 1;
                self.bytes += bytes;
            }
            Outcome::Directory => self.directories += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed(failed) => self.failures.push(failed),
        }
    }
}

/// What happened to a single entry.
#[derive(Debug)]
pub(crate) enum Outcome {
    File { bytes: u64 },
    Directory,
    Skipped,
    Failed(FailedEntry),
}

/// Sending half handed to worker tasks. Cheap to clone.
#[derive(Clone)]
pub(crate) struct OutcomeSink {
    tx: Sender<Outcome>,
}

impl OutcomeSink {
    pub(crate) fn send(&self, outcome: Outcome) {
        if self.tx.send(outcome).is_err() {
            log::error!("Outcome collector dropped; entry result lost.");
        }
    }

    pub(crate) fn failed(&self, path: impl Into<String>, error: Error) {
        let path = path.into();
        log::warn!("Failed '{}': {}", path, error);
        self.send(Outcome::Failed(FailedEntry { path, error }));
    }
}

/// Receiving half, drained once all workers have joined.
pub(crate) struct OutcomeCollector {
    rx: Receiver<Outcome>,
}

impl OutcomeCollector {
    /// Drains every outcome sent so far into a report.
    pub(crate) fn finish(self) -> RunReport {
        let mut report = RunReport::default();
        for outcome in self.rx.try_iter() {
            report.record(outcome);
        }
        debug!(
            "Collected outcomes: {} files, {} dirs, {} skipped, {} failed",
            report.files,
            report.directories,
            report.skipped,
            report.failures.len()
        );
        report
    }
}

pub(crate) fn outcome_channel() -> (OutcomeSink, OutcomeCollector) {
    let (tx, rx) = unbounded();
    (OutcomeSink { tx }, OutcomeCollector { rx })
}

/// Writes the end-of-run summary, listing failed entries if any.
pub fn write_summary(writer: &mut dyn Write, report: &RunReport) -> std::io::Result<()> {
    writeln!(
        writer,
        "Downloaded {} files ({} bytes), created {} directories, skipped {} entries.",
        report.files, report.bytes, report.directories, report.skipped
    )?;
    if !report.failures.is_empty() {
        writeln!(writer, "Failed entries: ({})", report.failures.len())?;
        let mut failures: Vec<&FailedEntry> = report.failures.iter().collect();
        failures.sort_by(|a, b| a.path.cmp(&b.path));
        for failed in failures {
            writeln!(writer, "- {}: {}", failed.path, failed.error)?;
        }
    }
    Ok(())
}

//! Batch progress and summary reporting
//!
//! Progress is an observable side effect of a batch: the coordinator pushes
//! a [`BatchProgress`] snapshot to a [`ProgressReporter`] after every item.

use crate::crawler::{BatchResult, ItemOutcome};
use std::sync::Mutex;

/// Running counters for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchProgress {
    /// Number of URLs in the batch
    pub total: usize,

    /// URLs finished so far, successfully or not
    pub processed: usize,

    /// URLs exported
    pub succeeded: usize,

    /// URLs that failed
    pub failed: usize,
}

impl BatchProgress {
    /// Creates counters for a batch of `total` URLs
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Records one finished item
    pub fn record(&mut self, outcome: &ItemOutcome) {
        self.processed += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Percentage of processed items that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.processed as f64) * 100.0
        }
    }
}

/// Receives progress after every batch item
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: &BatchProgress, outcome: &ItemOutcome);
}

/// Reports progress through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, progress: &BatchProgress, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Success(file) => tracing::info!(
                "[{}/{}] Saved {} ({} bytes)",
                progress.processed,
                progress.total,
                file.path.display(),
                file.byte_size
            ),
            ItemOutcome::Failure(failure) => tracing::warn!(
                "[{}/{}] Failed {} at {}: {}",
                progress.processed,
                progress.total,
                failure.url,
                failure.stage,
                failure.error
            ),
        }
    }
}

/// Keeps every progress snapshot in memory
#[derive(Debug, Default)]
pub struct RecordingProgress {
    snapshots: Mutex<Vec<BatchProgress>>,
}

impl RecordingProgress {
    /// Creates an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots received so far, in order
    pub fn snapshots(&self) -> Vec<BatchProgress> {
        self.snapshots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, progress: &BatchProgress, _outcome: &ItemOutcome) {
        self.snapshots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*progress);
    }
}

/// Formats a finished batch as a human-readable summary
pub fn format_batch_summary(result: &BatchResult) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Summary ===\n\n");
    out.push_str(&format!("  Processed: {}\n", result.len()));
    out.push_str(&format!("  Succeeded: {}\n", result.succeeded()));
    out.push_str(&format!("  Failed:    {}\n", result.failed()));

    let files: Vec<_> = result.exported_files().collect();
    if !files.is_empty() {
        out.push_str("\nExported Files:\n");
        for file in files {
            out.push_str(&format!("  - {} ({} bytes)\n", file.path.display(), file.byte_size));
        }
    }

    let failures: Vec<_> = result.failures().collect();
    if !failures.is_empty() {
        out.push_str("\nFailures:\n");
        for failure in failures {
            out.push_str(&format!(
                "  - {} [{}] {}\n",
                failure.url, failure.stage, failure.error
            ));
        }
    }

    out
}

/// Prints a finished batch summary to stdout
pub fn print_batch_summary(result: &BatchResult) {
    print!("{}", format_batch_summary(result));
}

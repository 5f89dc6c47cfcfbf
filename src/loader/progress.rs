//! Progress reporting for batch loads.
//!
//! A [`LoadProgress`] implementation is notified once before reading starts,
//! once per file as it is read (possibly from several threads when
//! `parallel-processing` is enabled) and once when grouping has finished.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[cfg(feature = "progress-tracking")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::loader::LoadSummary;

/// Observer for a running batch load.
pub trait LoadProgress: Send + Sync {
    /// Called once with the number of files about to be read.
    fn start(&self, total_files: usize);

    /// Called after each file has been read, successfully or not.
    fn file_done(&self, path: &Path, ok: bool);

    /// Called once after all stations have been assembled.
    fn finish(&self, summary: &LoadSummary, elapsed: Duration) {
        let _ = (summary, elapsed);
    }
}

impl<P: LoadProgress + ?Sized> LoadProgress for Arc<P> {
    fn start(&self, total_files: usize) {
        (**self).start(total_files);
    }

    fn file_done(&self, path: &Path, ok: bool) {
        (**self).file_done(path, ok);
    }

    fn finish(&self, summary: &LoadSummary, elapsed: Duration) {
        (**self).finish(summary, elapsed);
    }
}

/// Counts files without printing anything.
#[derive(Debug, Default)]
pub struct CountingProgress {
    total: AtomicUsize,
    done: AtomicUsize,
    failed: AtomicUsize,
}

impl CountingProgress {
    /// Create a counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files announced by [`LoadProgress::start`].
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Files read so far.
    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    /// Files that failed to read.
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// Fraction of files read, 0.0 to 1.0.
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.done() as f64 / total as f64
    }
}

impl LoadProgress for CountingProgress {
    fn start(&self, total_files: usize) {
        self.total.store(total_files, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }

    fn file_done(&self, _path: &Path, ok: bool) {
        self.done.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Terminal progress bar using indicatif.
#[cfg(feature = "progress-tracking")]
#[derive(Debug)]
pub struct ProgressBarReporter {
    bar: ProgressBar,
    start_time: Instant,
}

#[cfg(feature = "progress-tracking")]
impl ProgressBarReporter {
    /// Create a hidden bar; it is sized in [`LoadProgress::start`].
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self {
            bar,
            start_time: Instant::now(),
        }
    }

    /// Create a bar with a custom style.
    pub fn with_style(style: ProgressStyle) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self {
            bar,
            start_time: Instant::now(),
        }
    }

    /// Time since the bar was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(feature = "progress-tracking")]
impl Default for ProgressBarReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "progress-tracking")]
impl LoadProgress for ProgressBarReporter {
    fn start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.set_position(0);
    }

    fn file_done(&self, path: &Path, _ok: bool) {
        if let Some(name) = path.file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
        self.bar.inc(1);
    }

    fn finish(&self, summary: &LoadSummary, _elapsed: Duration) {
        self.bar.finish_with_message(summary.to_string());
    }
}

/// Times a load and forwards to an optional reporter.
pub(crate) struct Tracker<'a> {
    reporter: Option<&'a dyn LoadProgress>,
    started: Instant,
}

impl<'a> Tracker<'a> {
    pub(crate) fn start(reporter: Option<&'a dyn LoadProgress>, total_files: usize) -> Self {
        if let Some(reporter) = reporter {
            reporter.start(total_files);
        }
        Self {
            reporter,
            started: Instant::now(),
        }
    }

    pub(crate) fn file_done(&self, path: &Path, ok: bool) {
        if let Some(reporter) = self.reporter {
            reporter.file_done(path, ok);
        }
    }

    pub(crate) fn finish(&self, summary: &LoadSummary) -> Duration {
        let elapsed = self.started.elapsed();
        if let Some(reporter) = self.reporter {
            reporter.finish(summary, elapsed);
        }
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_counting_progress() {
        let progress = CountingProgress::new();
        assert_eq!(progress.fraction(), 0.0);

        progress.start(4);
        progress.file_done(Path::new("a.sac"), true);
        progress.file_done(Path::new("b.sac"), false);

        assert_eq!(progress.total(), 4);
        assert_eq!(progress.done(), 2);
        assert_eq!(progress.failed(), 1);
        assert_approx_eq!(progress.fraction(), 0.5, 1e-12);
    }

    #[test]
    fn test_tracker_without_reporter() {
        let tracker = Tracker::start(None, 3);
        tracker.file_done(Path::new("a.sac"), true);
        let summary = LoadSummary {
            stations: 0,
            waveforms: 0,
        };
        let _ = tracker.finish(&summary);
    }
}
